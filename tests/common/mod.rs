#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use grammar_watch::{
    EngineErrorKind, EngineFactory, EngineSettings, EventSink, TranscriptionEngine,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Created {
        generation: u64,
        settings: EngineSettings,
    },
    Start(u64),
    Stop(u64),
    Abort(u64),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Behaves like a browser recognizer: stop reports `end`, abort reports
/// `aborted` then `end`.
pub struct MockEngine {
    sink: EventSink,
    log: CallLog,
}

impl TranscriptionEngine for MockEngine {
    fn start(&mut self) {
        self.log.lock().unwrap().push(Call::Start(self.sink.generation()));
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().push(Call::Stop(self.sink.generation()));
        self.sink.end();
    }

    fn abort(&mut self) {
        self.log.lock().unwrap().push(Call::Abort(self.sink.generation()));
        self.sink.error(EngineErrorKind::Aborted, "aborted");
        self.sink.end();
    }
}

pub struct MockFactory {
    pub log: CallLog,
    pub sinks: Arc<Mutex<Vec<EventSink>>>,
}

impl EngineFactory for MockFactory {
    fn create(
        &mut self,
        settings: &EngineSettings,
        sink: EventSink,
    ) -> Box<dyn TranscriptionEngine> {
        self.log.lock().unwrap().push(Call::Created {
            generation: sink.generation(),
            settings: settings.clone(),
        });
        self.sinks.lock().unwrap().push(sink.clone());
        Box::new(MockEngine {
            sink,
            log: self.log.clone(),
        })
    }
}
