//! Yes/no confirmation, asked before destructive actions.

use std::future::Future;

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> impl Future<Output = bool>;
}

/// Answers every question the same way. Useful for scripting and tests.
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

impl Confirm for Always {
    async fn confirm(&mut self, _question: &str) -> bool {
        self.0
    }
}
