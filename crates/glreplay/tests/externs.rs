use std::sync::{Arc, Mutex};

use glreplay::emitter::{DeviceEmitter, MemoryRange};
use glreplay::extras::gl::{Endian, PixelFormat, PixelType};
use glreplay::extras::{ErrorState, ExtrasBag, ProgramIntrospection, ResourceId};
use glreplay::{
    CaptureId, Command, CommandIndex, ContentResolver, ContentStore, DeviceId, DiagnosticSink,
    ErrorKind, ExternError, Externs, IndexRange, MessageId, ReplayTarget, ResolveError, Severity,
    StateModel, TextureId,
};

#[derive(Default)]
struct RecordingEmitter {
    mapped: Vec<MemoryRange>,
    unmapped: Vec<MemoryRange>,
}

impl DeviceEmitter for RecordingEmitter {
    fn mark_mapped(&mut self, range: MemoryRange) {
        self.mapped.push(range);
    }

    fn mark_unmapped(&mut self, range: MemoryRange) {
        self.unmapped.push(range);
    }
}

struct FixedOutcome(ResolveError);

impl ContentResolver for FixedOutcome {
    fn resolve(&self, _id: &ResourceId) -> Result<Arc<[u8]>, ResolveError> {
        Err(self.0.clone())
    }
}

#[derive(Default)]
struct RecordingSink {
    errors: Mutex<Vec<u32>>,
    messages: Mutex<Vec<(Severity, String)>>,
    tags: Mutex<Vec<(MessageId, String)>>,
}

impl DiagnosticSink for RecordingSink {
    fn on_error(&self, code: u32) {
        self.errors.lock().unwrap().push(code);
    }

    fn new_message(&self, severity: Severity, message: &str) -> MessageId {
        let mut messages = self.messages.lock().unwrap();
        messages.push((severity, message.to_owned()));
        MessageId(messages.len() as u64)
    }

    fn add_tag(&self, id: MessageId, tag: &str) {
        self.tags.lock().unwrap().push((id, tag.to_owned()));
    }
}

fn target() -> ReplayTarget {
    ReplayTarget {
        capture: CaptureId(4),
        device: DeviceId(9),
    }
}

const RANGE: MemoryRange = MemoryRange {
    base: 0x1000,
    size: 0x40,
};

#[test]
fn map_bookkeeping_is_limited_to_the_map_family() {
    let state = StateModel::default();
    let store = ContentStore::new();
    let mut emitter = RecordingEmitter::default();

    for name in ["glMapBufferRange", "glMapBufferOES", "glBufferData"] {
        let cmd = Command::new(name);
        let mut externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store)
            .with_emitter(&mut emitter);
        externs.map_memory(RANGE);
        externs.unmap_memory(RANGE);
    }

    assert_eq!(emitter.mapped, vec![RANGE, RANGE]);
    assert_eq!(emitter.unmapped, vec![RANGE, RANGE, RANGE]);
}

#[test]
fn map_bookkeeping_without_emitter_is_a_no_op() {
    let state = StateModel::default();
    let store = ContentStore::new();
    let cmd = Command::new("glMapBufferRange");
    let mut externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);
    externs.map_memory(RANGE);
    externs.unmap_memory(RANGE);
}

#[test]
fn index_range_reads_resolved_bytes() {
    let state = StateModel::default();
    let store = ContentStore::new();
    let id = store.store(vec![2u8, 0, 5, 0, 1, 0]);
    let cmd = Command::new("glDrawElements");
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);

    assert_eq!(
        externs.compute_index_range(id, 2).unwrap(),
        IndexRange { first: 1, count: 3 }
    );
}

#[test]
fn index_range_follows_state_endianness() {
    let mut state = StateModel::default();
    state.memory_layout.endian = Endian::Big;
    let store = ContentStore::new();
    let id = store.store(vec![0u8, 2, 0, 5, 0, 1]);
    let cmd = Command::new("glDrawElements");
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);

    assert_eq!(
        externs.compute_index_range(id, 2).unwrap(),
        IndexRange { first: 1, count: 3 }
    );
}

#[test]
fn cancelled_index_data_yields_zero_range() {
    let state = StateModel::default();
    let content = FixedOutcome(ResolveError::Cancelled);
    let cmd = Command::new("glDrawElements");
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &content);

    assert_eq!(
        externs.compute_index_range(ResourceId::ZERO, 2).unwrap(),
        IndexRange::default()
    );
}

#[test]
fn other_index_data_failures_are_fatal() {
    let state = StateModel::default();
    let cmd = Command::new("glDrawElements");

    let content = FixedOutcome(ResolveError::Failed("disk gone".to_owned()));
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &content);
    let err = externs.compute_index_range(ResourceId::ZERO, 2).unwrap_err();
    assert!(matches!(err, ExternError::IndexData { .. }));
    assert_eq!(err.kind(), ErrorKind::Internal);

    let store = ContentStore::new();
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);
    let err = externs.compute_index_range(ResourceId::ZERO, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = externs.compute_index_range(ResourceId::ZERO, 3).unwrap_err();
    assert!(matches!(err, ExternError::UnsupportedIndexSize(3)));
}

#[test]
fn lookups_return_first_match_as_independent_copies() {
    let mut extras = ExtrasBag::new();
    extras.register(ErrorState {
        trace_driver_error: 0x502,
        interceptor_error: 0,
    });
    extras.register(ErrorState {
        trace_driver_error: 0x500,
        interceptor_error: 1,
    });
    let cmd = Command::new("glTexImage2D").with_extras(extras);
    let state = StateModel::default();
    let store = ContentStore::new();
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);

    let mut first = externs.lookup_error_state().unwrap();
    assert_eq!(first.trace_driver_error, 0x502);
    first.trace_driver_error = 0;
    assert_eq!(externs.lookup_error_state().unwrap().trace_driver_error, 0x502);

    assert_eq!(externs.lookup_program_introspection(), None::<ProgramIntrospection>);
    assert!(externs.lookup_static_context_state().is_none());
    assert!(externs.lookup_dynamic_context_state().is_none());
    assert!(externs.lookup_platform_buffer_descriptor().is_none());
    assert!(externs.lookup_image_snapshot().is_none());
}

#[test]
fn diagnostics_without_sink() {
    let state = StateModel::default();
    let store = ContentStore::new();
    let cmd = Command::new("glGetError");
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);

    externs.dispatch_error(0x500);
    assert_eq!(externs.dispatch_message(2, "hello").unwrap(), MessageId::NONE);
    externs.tag_message(MessageId::NONE, "tag");

    // Severity is validated even with nobody listening.
    assert!(matches!(
        externs.dispatch_message(17, "bad"),
        Err(ExternError::UnknownSeverity(17))
    ));
}

#[test]
fn diagnostics_reach_the_sink() {
    let sink = Arc::new(RecordingSink::default());
    let state = StateModel {
        diagnostics: Some(sink.clone() as Arc<dyn DiagnosticSink>),
        ..StateModel::default()
    };
    let store = ContentStore::new();
    let cmd = Command::new("glGetError");
    let externs = Externs::new(target(), &cmd, CommandIndex(1), &state, &store);

    externs.dispatch_error(0x502);
    let id = externs.dispatch_message(3, "texture incomplete").unwrap();
    externs.tag_message(id, "draw");

    assert_eq!(*sink.errors.lock().unwrap(), vec![0x502]);
    assert_eq!(
        *sink.messages.lock().unwrap(),
        vec![(Severity::Error, "texture incomplete".to_owned())]
    );
    assert_eq!(*sink.tags.lock().unwrap(), vec![(id, "draw".to_owned())]);
    assert!(Severity::Debug < Severity::Info && Severity::Error < Severity::Fatal);
}

#[test]
fn readback_key_captures_command_position() {
    let state = StateModel::default();
    let store = ContentStore::new();
    let cmd = Command::new("glReadPixels");
    let externs = Externs::new(target(), &cmd, CommandIndex(77), &state, &store);

    let key = externs.read_gpu_texture_data(
        TextureId(3),
        1,
        0,
        PixelFormat::Rgba,
        PixelType::UnsignedByte,
    );
    assert_eq!(key.target, target());
    assert_eq!(key.position, CommandIndex(77));
    assert_eq!((key.texture, key.level, key.layer), (TextureId(3), 1, 0));
}
