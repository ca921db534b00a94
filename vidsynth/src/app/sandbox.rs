use super::*;

impl App {
    // ========== Sandbox View Methods ==========

    /// Handle keyboard input in the cluster sandbox.
    pub(super) fn handle_sandbox_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up | KeyCode::Char('k') => {
                self.sandbox.adjust_k(1);
            }
            KeyCode::Char('-') | KeyCode::Down | KeyCode::Char('j') => {
                self.sandbox.adjust_k(-1);
            }
            KeyCode::Enter | KeyCode::Char('r') => {
                self.sandbox.run(&mut self.rng);
            }
            KeyCode::Esc => {
                self.switch_view();
            }
            _ => {}
        }
    }
}
