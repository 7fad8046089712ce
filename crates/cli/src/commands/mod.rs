mod check;
mod score;
mod tokens;

pub(crate) use check::cmd_check;
pub(crate) use score::{cmd_score, ScoreAgainst};
pub(crate) use tokens::cmd_tokens;
