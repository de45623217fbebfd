//! Recording fake of the image/depth generators
//!
//! Every SDK call is appended to a [`CallLog`] shared by both generators of a
//! pair, so tests can assert the exact cross-stream ordering.

use crate::controller::lock;
use crate::sdk::{DepthGenerator, FrameCallback, Generator, SdkResult, SdkStatus, SubscriptionHandle};
use crate::types::{Cropping, PixelFormat, RawFrame, StreamKind, StreamMode};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Status code the fake reports for injected failures
pub const FAKE_FAILURE_CODE: u32 = 0x1000_0001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkOp {
    SetIntProperty(String, i64),
    SetPixelFormat(PixelFormat),
    SetMapOutputMode(StreamMode),
    Register,
    Unregister,
    StartGenerating,
    StopGenerating,
    SetViewPoint(bool),
    SetFrameSync(bool),
    SetCropping(Option<Cropping>),
}

impl SdkOp {
    /// Name used with [`FakeGenerator::fail_on`]
    pub fn name(&self) -> &'static str {
        match self {
            SdkOp::SetIntProperty(..) => "set_int_property",
            SdkOp::SetPixelFormat(_) => "set_pixel_format",
            SdkOp::SetMapOutputMode(_) => "set_map_output_mode",
            SdkOp::Register => "register_for_new_data",
            SdkOp::Unregister => "unregister_from_new_data",
            SdkOp::StartGenerating => "start_generating",
            SdkOp::StopGenerating => "stop_generating",
            SdkOp::SetViewPoint(_) => "set_view_point",
            SdkOp::SetFrameSync(_) => "set_frame_sync",
            SdkOp::SetCropping(_) => "set_cropping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkCall {
    pub stream: StreamKind,
    pub op: SdkOp,
}

impl SdkCall {
    pub fn new(stream: StreamKind, op: SdkOp) -> Self {
        Self { stream, op }
    }

    pub fn image_int(name: &str, value: i64) -> Self {
        Self::new(StreamKind::Image, SdkOp::SetIntProperty(name.to_string(), value))
    }

    pub fn depth_int(name: &str, value: i64) -> Self {
        Self::new(StreamKind::Depth, SdkOp::SetIntProperty(name.to_string(), value))
    }

    pub fn image_pixel_format(format: PixelFormat) -> Self {
        Self::new(StreamKind::Image, SdkOp::SetPixelFormat(format))
    }

    pub fn view_point(registered: bool) -> Self {
        Self::new(StreamKind::Depth, SdkOp::SetViewPoint(registered))
    }

    pub fn start(stream: StreamKind) -> Self {
        Self::new(stream, SdkOp::StartGenerating)
    }

    pub fn stop(stream: StreamKind) -> Self {
        Self::new(stream, SdkOp::StopGenerating)
    }

    pub fn register(stream: StreamKind) -> Self {
        Self::new(stream, SdkOp::Register)
    }

    pub fn unregister(stream: StreamKind) -> Self {
        Self::new(stream, SdkOp::Unregister)
    }

    pub fn is_depth(&self) -> bool {
        self.stream == StreamKind::Depth
    }
}

/// Shared, ordered record of SDK calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<SdkCall>>>,
}

impl CallLog {
    fn push(&self, call: SdkCall) {
        lock(&self.calls).push(call);
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        lock(&self.calls).clone()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    /// Only the calls that start/stop streams or touch registration
    pub fn stream_sequence(&self) -> Vec<SdkCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c.op,
                    SdkOp::StartGenerating | SdkOp::StopGenerating | SdkOp::SetViewPoint(_)
                )
            })
            .collect()
    }

    pub fn count(&self, stream: StreamKind, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.stream == stream && c.op.name() == name)
            .count()
    }
}

#[derive(Default)]
struct FakeInner {
    generating: bool,
    registration_supported: bool,
    subscribers: BTreeMap<u64, FrameCallback>,
    next_handle: u64,
    failing: HashSet<String>,
}

/// In-memory generator; clones share state so tests can keep a handle
/// after boxing one into a device.
#[derive(Clone)]
pub struct FakeGenerator {
    stream: StreamKind,
    log: CallLog,
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeGenerator {
    pub fn new(stream: StreamKind, log: CallLog) -> Self {
        Self {
            stream,
            log,
            inner: Arc::new(Mutex::new(FakeInner {
                registration_supported: true,
                next_handle: 1,
                ..FakeInner::default()
            })),
        }
    }

    /// Image and depth generators writing to one call log
    pub fn pair() -> (FakeGenerator, FakeGenerator, CallLog) {
        let log = CallLog::default();
        (
            FakeGenerator::new(StreamKind::Image, log.clone()),
            FakeGenerator::new(StreamKind::Depth, log.clone()),
            log,
        )
    }

    pub fn without_registration_support(self) -> Self {
        lock(&self.inner).registration_supported = false;
        self
    }

    /// Make every subsequent call with this name fail
    pub fn fail_on(&self, op_name: &str) {
        lock(&self.inner).failing.insert(op_name.to_string());
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    /// Deliver a frame to every current subscriber; returns how many saw it.
    ///
    /// The state lock is held across delivery, which is what guarantees that
    /// nothing fires once `unregister_from_new_data` has returned.
    pub fn emit(&self, frame: RawFrame) -> usize {
        let inner = lock(&self.inner);
        for callback in inner.subscribers.values() {
            callback(frame.clone());
        }
        inner.subscribers.len()
    }

    fn record(&self, op: SdkOp) -> SdkResult<()> {
        let name = op.name();
        self.log.push(SdkCall::new(self.stream, op));
        if lock(&self.inner).failing.contains(name) {
            return Err(SdkStatus::new(
                FAKE_FAILURE_CODE,
                format!("injected failure in {name}"),
            ));
        }
        Ok(())
    }
}

impl Generator for FakeGenerator {
    fn set_int_property(&mut self, name: &str, value: i64) -> SdkResult<()> {
        self.record(SdkOp::SetIntProperty(name.to_string(), value))
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> SdkResult<()> {
        self.record(SdkOp::SetPixelFormat(format))
    }

    fn set_map_output_mode(&mut self, mode: StreamMode) -> SdkResult<()> {
        self.record(SdkOp::SetMapOutputMode(mode))
    }

    fn register_for_new_data(&mut self, callback: FrameCallback) -> SdkResult<SubscriptionHandle> {
        self.record(SdkOp::Register)?;
        let mut inner = lock(&self.inner);
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.subscribers.insert(handle, callback);
        Ok(SubscriptionHandle(handle))
    }

    fn unregister_from_new_data(&mut self, handle: SubscriptionHandle) {
        self.log.push(SdkCall::unregister(self.stream));
        lock(&self.inner).subscribers.remove(&handle.0);
    }

    fn start_generating(&mut self) -> SdkResult<()> {
        self.record(SdkOp::StartGenerating)?;
        lock(&self.inner).generating = true;
        Ok(())
    }

    fn stop_generating(&mut self) -> SdkResult<()> {
        self.record(SdkOp::StopGenerating)?;
        lock(&self.inner).generating = false;
        Ok(())
    }

    fn is_generating(&self) -> bool {
        lock(&self.inner).generating
    }
}

impl DepthGenerator for FakeGenerator {
    fn is_registration_supported(&self) -> bool {
        lock(&self.inner).registration_supported
    }

    fn set_view_point(&mut self, registered: bool) -> SdkResult<()> {
        self.record(SdkOp::SetViewPoint(registered))
    }

    fn set_frame_sync(&mut self, enabled: bool) -> SdkResult<()> {
        self.record(SdkOp::SetFrameSync(enabled))
    }

    fn set_cropping(&mut self, cropping: Option<Cropping>) -> SdkResult<()> {
        self.record(SdkOp::SetCropping(cropping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure_is_logged_and_reported() {
        let (mut image, _depth, log) = FakeGenerator::pair();
        image.fail_on("start_generating");

        let err = image.start_generating().unwrap_err();
        assert_eq!(err.code, FAKE_FAILURE_CODE);
        assert!(!image.is_generating());
        assert_eq!(log.calls(), vec![SdkCall::start(StreamKind::Image)]);
    }

    #[test]
    fn test_unregistered_callback_does_not_fire() {
        let (mut image, _depth, _log) = FakeGenerator::pair();
        let seen = Arc::new(Mutex::new(0u32));
        let counter = seen.clone();
        let handle = image
            .register_for_new_data(Arc::new(move |_: RawFrame| *counter.lock().unwrap() += 1))
            .unwrap();

        assert_eq!(image.emit(RawFrame::new(1, 2, 2, vec![0; 4])), 1);
        image.unregister_from_new_data(handle);
        assert_eq!(image.emit(RawFrame::new(2, 2, 2, vec![0; 4])), 0);
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
