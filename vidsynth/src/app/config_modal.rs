use super::*;

impl App {
    // ========== Project Config Modal Methods ==========

    /// Handle keyboard input while the project config modal is open.
    pub(super) fn handle_config_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.config_modal.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.config_modal = None;
            }
            KeyCode::Down => {
                let last = self.pipeline.videos().len().saturating_sub(1);
                modal.cursor = (modal.cursor + 1).min(last);
                self.select_modal_video();
            }
            KeyCode::Up => {
                modal.cursor = modal.cursor.saturating_sub(1);
                self.select_modal_video();
            }
            KeyCode::F(5) => {
                if modal.uploading {
                    tracing::debug!("Sync ignored while an upload is in flight");
                } else {
                    self.load_assets();
                }
            }
            KeyCode::Enter => {
                if modal.uploading {
                    return;
                }
                let paths = parse_paths(&modal.input);
                if paths.is_empty() {
                    modal.upload_error = Some("No files selected".to_string());
                    return;
                }
                modal.uploading = true;
                modal.upload_error = None;
                tracing::info!(files = paths.len(), "Uploading source videos");
                self.send(WorkerCommand::ImportVideos { paths });
            }
            KeyCode::Backspace => {
                modal.input.pop();
            }
            KeyCode::Char(c) => {
                modal.input.push(c);
            }
            _ => {}
        }
    }

    /// Make the highlighted pool entry the active video.
    fn select_modal_video(&mut self) {
        let Some(cursor) = self.config_modal.as_ref().map(|m| m.cursor) else {
            return;
        };
        let Some(id) = self.pipeline.videos().get(cursor).map(|v| v.id.clone()) else {
            return;
        };
        let effects = self.pipeline.select_video(&id);
        self.dispatch(effects);
    }

    /// An upload finished; refresh the pool on success.
    pub(super) fn finish_import(&mut self, result: Result<(), String>) {
        match self.config_modal.as_mut() {
            Some(modal) => {
                modal.uploading = false;
                match &result {
                    Ok(()) => {
                        modal.input.clear();
                        modal.upload_error = None;
                    }
                    Err(message) => modal.upload_error = Some(message.clone()),
                }
            }
            None => {
                if let Err(message) = &result {
                    tracing::warn!(error = %message, "Upload failed after modal closed");
                }
            }
        }
        if result.is_ok() {
            self.load_assets();
        }
    }
}
