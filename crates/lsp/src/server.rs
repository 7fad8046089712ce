//! LSP server main loop with request/notification dispatch.
//!
//! Uses `lsp-server` (synchronous, crossbeam-based) for the transport.
//! Every request is answered from the editor's copy of the document; the
//! analysis itself never touches the file system.

use le_core::AnalysisConfig;
use lsp_server::{Connection, Message, Notification, Response};
use lsp_types::notification::{
    DidChangeConfiguration, DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument,
    DidSaveTextDocument, Notification as _, PublishDiagnostics,
};
use lsp_types::request::SemanticTokensFullRequest;
use lsp_types::{
    PublishDiagnosticsParams, SaveOptions, SemanticTokens, SemanticTokensFullOptions,
    SemanticTokensOptions, SemanticTokensResult, ServerCapabilities, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Uri,
};
use std::path::PathBuf;

use crate::diagnostics;
use crate::document::{config_from_settings, DocumentState};
use crate::semantic_tokens;

/// Run the LSP server over stdio until shutdown.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, io_threads) = Connection::stdio();
    serve(&connection)?;
    io_threads.join()?;
    Ok(())
}

/// Run the initialize handshake and the main loop on an open connection.
pub fn serve(connection: &Connection) -> Result<(), Box<dyn std::error::Error>> {
    // ── Initialize handshake ──────────────────────────────────────────
    let server_capabilities = build_capabilities();
    let init_json = serde_json::to_value(&server_capabilities)?;
    let init_params: lsp_types::InitializeParams =
        serde_json::from_value(connection.initialize(init_json)?)?;

    let mut config = init_params
        .initialization_options
        .as_ref()
        .map(config_from_settings)
        .unwrap_or_default();
    tracing::info!(
        max_number_of_problems = config.max_number_of_problems,
        "language server initialized"
    );

    // ── Main loop ─────────────────────────────────────────────────────
    let mut doc_state = DocumentState::new();

    for msg in &connection.receiver {
        match msg {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    break;
                }
                handle_request(connection, &doc_state, req)?;
            }
            Message::Notification(not) => {
                handle_notification(connection, &mut doc_state, &mut config, not)?;
            }
            Message::Response(_) => {
                // Ignore responses (we don't send requests to the client)
            }
        }
    }

    tracing::info!("language server shut down");
    Ok(())
}

pub fn build_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(false),
                })),
                ..Default::default()
            },
        )),
        semantic_tokens_provider: Some(
            lsp_types::SemanticTokensServerCapabilities::SemanticTokensOptions(
                SemanticTokensOptions {
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                    legend: semantic_tokens::legend(),
                    ..Default::default()
                },
            ),
        ),
        ..Default::default()
    }
}

fn handle_request(
    connection: &Connection,
    doc_state: &DocumentState,
    req: lsp_server::Request,
) -> Result<(), Box<dyn std::error::Error>> {
    use lsp_types::request::Request as _;

    if req.method == SemanticTokensFullRequest::METHOD {
        let params: lsp_types::SemanticTokensParams = serde_json::from_value(req.params.clone())?;
        let content = get_document_content(doc_state, &params.text_document.uri);
        let result = SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: semantic_tokens::compute_semantic_tokens(&content),
        });
        let resp = Response::new_ok(req.id, serde_json::to_value(result)?);
        connection.sender.send(Message::Response(resp))?;
    } else {
        // Unknown request -- method not found
        tracing::debug!(method = %req.method, "unhandled request");
        let resp = Response::new_err(
            req.id,
            lsp_server::ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        );
        connection.sender.send(Message::Response(resp))?;
    }
    Ok(())
}

/// Get document content either from open documents or from disk.
fn get_document_content(doc_state: &DocumentState, uri: &Uri) -> String {
    if let Some(doc) = doc_state.get(uri.as_str()) {
        doc.content.clone()
    } else {
        let path = uri_to_path(uri);
        std::fs::read_to_string(&path).unwrap_or_default()
    }
}

fn handle_notification(
    connection: &Connection,
    doc_state: &mut DocumentState,
    config: &mut AnalysisConfig,
    not: Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    match not.method.as_str() {
        m if m == DidOpenTextDocument::METHOD => {
            let params: lsp_types::DidOpenTextDocumentParams = serde_json::from_value(not.params)?;
            let uri = params.text_document.uri;
            doc_state.open(
                uri.as_str(),
                params.text_document.version,
                params.text_document.text,
            );
            publish_for(connection, doc_state, config, uri)?;
        }
        m if m == DidChangeTextDocument::METHOD => {
            let params: lsp_types::DidChangeTextDocumentParams =
                serde_json::from_value(not.params)?;
            let uri = params.text_document.uri;
            // FULL sync: last content change has the entire document
            if let Some(change) = params.content_changes.into_iter().last() {
                doc_state.change(uri.as_str(), params.text_document.version, change.text);
            }
            publish_for(connection, doc_state, config, uri)?;
        }
        m if m == DidSaveTextDocument::METHOD => {
            let params: lsp_types::DidSaveTextDocumentParams = serde_json::from_value(not.params)?;
            publish_for(connection, doc_state, config, params.text_document.uri)?;
        }
        m if m == DidCloseTextDocument::METHOD => {
            let params: lsp_types::DidCloseTextDocumentParams = serde_json::from_value(not.params)?;
            doc_state.close(params.text_document.uri.as_str());
            // Clear diagnostics for closed file
            publish_diagnostics(connection, params.text_document.uri, Vec::new())?;
        }
        m if m == DidChangeConfiguration::METHOD => {
            let params: lsp_types::DidChangeConfigurationParams =
                serde_json::from_value(not.params)?;
            *config = config_from_settings(&params.settings);
            tracing::debug!(
                max_number_of_problems = config.max_number_of_problems,
                "settings changed"
            );
            // Revalidate everything open under the new settings
            for uri in doc_state.uris() {
                let Ok(uri) = uri.parse::<Uri>() else {
                    continue;
                };
                publish_for(connection, doc_state, config, uri)?;
            }
        }
        _ => {
            // Unknown notification -- ignore
        }
    }
    Ok(())
}

/// Analyze the tracked content of `uri` and publish the result.
fn publish_for(
    connection: &Connection,
    doc_state: &DocumentState,
    config: &AnalysisConfig,
    uri: Uri,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = get_document_content(doc_state, &uri);
    let diags = diagnostics::compute_diagnostics(&content, config);
    publish_diagnostics(connection, uri, diags)
}

/// Send `textDocument/publishDiagnostics` notification to the client.
fn publish_diagnostics(
    connection: &Connection,
    uri: Uri,
    diagnostics: Vec<lsp_types::Diagnostic>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = PublishDiagnosticsParams {
        uri,
        diagnostics,
        version: None,
    };
    let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
    connection.sender.send(Message::Notification(not))?;
    Ok(())
}

/// Convert an LSP URI to a file system path.
///
/// Handles `file:///path/to/file` URIs by stripping the scheme and authority
/// and percent-decoding (e.g. `%20` → ` `).
fn uri_to_path(uri: &Uri) -> PathBuf {
    let s = uri.as_str();
    if let Some(path) = s.strip_prefix("file://") {
        let decoded = percent_decode(path);
        // On Windows: file:///C:/foo -> C:/foo (strip leading /)
        #[cfg(windows)]
        {
            let decoded = decoded.strip_prefix('/').unwrap_or(&decoded);
            PathBuf::from(decoded)
        }
        #[cfg(not(windows))]
        {
            PathBuf::from(decoded)
        }
    } else {
        PathBuf::from(s)
    }
}

/// Decode percent-encoded bytes in a URI path, keeping multi-byte UTF-8 intact.
fn percent_decode(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input.bytes();
    while let Some(b) = rest.next() {
        if b != b'%' {
            bytes.push(b);
            continue;
        }
        match (rest.next(), rest.next()) {
            (Some(hi), Some(lo)) => match (hex_val(hi), hex_val(lo)) {
                (Some(h), Some(l)) => bytes.push(h << 4 | l),
                // Malformed percent encoding -- pass through
                _ => bytes.extend([b'%', hi, lo]),
            },
            (Some(hi), None) => bytes.extend([b'%', hi]),
            _ => bytes.push(b'%'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
