use super::*;

/// Seek step for the playhead, in seconds
const SEEK_STEP: f64 = 5.0;

impl App {
    // ========== Pipeline View Methods ==========

    /// Handle keyboard input in the pipeline view.
    pub(super) fn handle_pipeline_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('1') => self.stage = Stage::Segmentation,
            KeyCode::Char('2') => self.stage = Stage::Semantic,
            KeyCode::Char('3') => self.stage = Stage::Strategy,
            KeyCode::Char('4') => self.stage = Stage::FinalCut,
            KeyCode::Char(']') => {
                let effects = self.pipeline.select_relative(1);
                self.dispatch(effects);
            }
            KeyCode::Char('[') => {
                let effects = self.pipeline.select_relative(-1);
                self.dispatch(effects);
            }
            _ => match self.stage {
                Stage::Segmentation => self.handle_segmentation_key(key),
                Stage::Semantic => self.handle_semantic_key(key),
                Stage::Strategy => self.handle_strategy_key(key),
                Stage::FinalCut => {}
            },
        }
    }

    fn handle_segmentation_key(&mut self, key: KeyEvent) {
        let duration = self
            .pipeline
            .active_video()
            .map(|v| v.duration)
            .unwrap_or(0.0);
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => self.run_segmentation(),
            KeyCode::Char(' ') => self.pipeline.playback.toggle(Instant::now()),
            KeyCode::Down | KeyCode::Char('j') => self.pipeline.select_active_segment_relative(1),
            KeyCode::Up | KeyCode::Char('k') => self.pipeline.select_active_segment_relative(-1),
            KeyCode::Right | KeyCode::Char('l') => {
                let position = self.pipeline.playback.position() + SEEK_STEP;
                self.pipeline.playback.seek(position, duration);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let position = self.pipeline.playback.position() - SEEK_STEP;
                self.pipeline.playback.seek(position, duration);
            }
            _ => {}
        }
    }

    fn handle_semantic_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => {
                self.pipeline.semantic.start(Instant::now());
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
                self.pipeline.select_segment_relative(1);
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
                self.pipeline.select_segment_relative(-1);
            }
            _ => {}
        }
    }

    fn handle_strategy_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => {
                self.pipeline.strategy.start(Instant::now());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.strategy_field = self.strategy_field.next();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.strategy_field = self.strategy_field.prev();
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                self.adjust_strategy(1);
            }
            KeyCode::Char('-') | KeyCode::Left => {
                self.adjust_strategy(-1);
            }
            _ => {}
        }
    }

    fn adjust_strategy(&mut self, steps: i32) {
        let field = self.strategy_field;
        if let Some(params) = self.pipeline.strategy.params_mut() {
            params.adjust(field, steps);
        }
    }

    /// Execute (or re-run) segmentation for the active video.
    fn run_segmentation(&mut self) {
        if let Some(run) = self.pipeline.begin_run() {
            self.send(WorkerCommand::RunSegmentation {
                video_ids: run.video_ids,
                force: run.force,
            });
        }
    }
}
