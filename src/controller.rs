//! Stream startup/shutdown sequencing
//!
//! Owns both generators behind two locks. Whenever both are needed the depth
//! lock is taken first, so overlapping start/stop/teardown calls from
//! different threads cannot deadlock.
//!
//! Some PrimeSense units refuse to begin streaming images once a depth stream
//! has claimed the registration pipeline, unless registration is cycled right
//! before the image stream starts. With `cycle_registration_on_start` set the
//! controller performs that cycle:
//!
//! | start | depth running | registered | sequence                                  |
//! |-------|---------------|------------|-------------------------------------------|
//! | image | yes           | yes        | reg off, reg on, reg off, start, reg on   |
//! | image | yes           | no         | reg on, reg off, start                    |
//! | image | no            | -          | start                                     |
//! | depth | -             | yes        | reg off, start, reg on                    |
//! | depth | -             | no         | start                                     |
//!
//! A failure part-way through a sequence is returned as is; toggles already
//! applied are not rolled back.

use crate::errors::DeviceConfigError;
use crate::sdk::{DepthGenerator, FrameCallback, Generator, SubscriptionHandle};
use crate::types::{Cropping, RunState, StreamKind, StreamMode};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct StreamSlot<G: ?Sized> {
    kind: StreamKind,
    state: RunState,
    mode: Option<StreamMode>,
    subscription: Option<SubscriptionHandle>,
    generator: Box<G>,
}

impl<G: Generator + ?Sized> StreamSlot<G> {
    fn new(kind: StreamKind, generator: Box<G>) -> Self {
        Self {
            kind,
            state: RunState::Stopped,
            mode: None,
            subscription: None,
            generator,
        }
    }

    fn set_mode(&mut self, mode: StreamMode) -> Result<(), DeviceConfigError> {
        self.generator
            .set_map_output_mode(mode)
            .map_err(|status| DeviceConfigError::new("MapOutputMode", mode, status))?;
        self.mode = Some(mode);
        log::debug!("{} output mode set to {}", self.kind, mode);
        Ok(())
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), DeviceConfigError> {
        if self.subscription.is_none() {
            let handle = self
                .generator
                .register_for_new_data(callback)
                .map_err(|status| {
                    DeviceConfigError::operation(
                        "NewDataCallback",
                        format!("subscribe to {} frames", self.kind),
                        status,
                    )
                })?;
            self.subscription = Some(handle);
        }

        self.generator
            .start_generating()
            .map_err(|status| {
                DeviceConfigError::operation("StartGenerating", format!("start {} stream", self.kind), status)
            })?;
        self.state = RunState::Running;
        log::info!("Started {} stream", self.kind);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceConfigError> {
        if self.state == RunState::Running {
            self.generator
                .stop_generating()
                .map_err(|status| {
                    DeviceConfigError::operation("StopGenerating", format!("stop {} stream", self.kind), status)
                })?;
            self.state = RunState::Stopped;
            log::info!("Stopped {} stream", self.kind);
        }
        self.unsubscribe();
        Ok(())
    }

    /// Teardown variant of `stop`: never fails, always releases the subscription
    fn release(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Error stopping {} stream during teardown: {}", self.kind, e);
            self.state = RunState::Stopped;
            self.unsubscribe();
        }
    }

    fn unsubscribe(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.generator.unregister_from_new_data(handle);
        }
    }

    /// The SDK session can halt a generator behind our back, so the cached
    /// state only counts while the generator agrees.
    fn is_running(&self) -> bool {
        self.state == RunState::Running && self.generator.is_generating()
    }

    fn run_state(&self) -> RunState {
        if self.is_running() {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }
}

struct DepthSlot {
    stream: StreamSlot<dyn DepthGenerator>,
    registered: bool,
    synchronized: bool,
    cropping: Option<Cropping>,
}

impl DepthSlot {
    fn set_registration(&mut self, registered: bool) -> Result<(), DeviceConfigError> {
        if self.registered == registered {
            return Ok(());
        }
        self.stream
            .generator
            .set_view_point(registered)
            .map_err(|status| DeviceConfigError::new("DepthRegistration", registered, status))?;
        self.registered = registered;
        log::debug!("Depth registration {}", if registered { "on" } else { "off" });
        Ok(())
    }
}

/// Startup/shutdown state machine for the image and depth streams
pub struct StreamController {
    image: Mutex<StreamSlot<dyn Generator>>,
    depth: Mutex<DepthSlot>,
    cycle_registration_on_start: bool,
}

impl StreamController {
    pub fn new(
        image: Box<dyn Generator>,
        depth: Box<dyn DepthGenerator>,
        cycle_registration_on_start: bool,
    ) -> Self {
        Self {
            image: Mutex::new(StreamSlot::new(StreamKind::Image, image)),
            depth: Mutex::new(DepthSlot {
                stream: StreamSlot::new(StreamKind::Depth, depth),
                registered: false,
                synchronized: false,
                cropping: None,
            }),
            cycle_registration_on_start,
        }
    }

    /// Run `f` on the image generator while holding the image lock
    pub fn with_image_generator<R>(&self, f: impl FnOnce(&mut dyn Generator) -> R) -> R {
        let mut image = lock(&self.image);
        f(image.generator.as_mut())
    }

    /// Run `f` on the depth generator while holding the depth lock
    pub fn with_depth_generator<R>(&self, f: impl FnOnce(&mut dyn DepthGenerator) -> R) -> R {
        let mut depth = lock(&self.depth);
        f(depth.stream.generator.as_mut())
    }

    pub fn set_output_mode(&self, kind: StreamKind, mode: StreamMode) -> Result<(), DeviceConfigError> {
        match kind {
            StreamKind::Image => lock(&self.image).set_mode(mode),
            StreamKind::Depth => lock(&self.depth).stream.set_mode(mode),
        }
    }

    pub fn output_mode(&self, kind: StreamKind) -> Option<StreamMode> {
        match kind {
            StreamKind::Image => lock(&self.image).mode,
            StreamKind::Depth => lock(&self.depth).stream.mode,
        }
    }

    pub fn run_state(&self, kind: StreamKind) -> RunState {
        match kind {
            StreamKind::Image => lock(&self.image).run_state(),
            StreamKind::Depth => lock(&self.depth).stream.run_state(),
        }
    }

    pub fn is_running(&self, kind: StreamKind) -> bool {
        self.run_state(kind) == RunState::Running
    }

    pub fn is_registration_supported(&self) -> bool {
        lock(&self.depth).stream.generator.is_registration_supported()
    }

    pub fn is_depth_registered(&self) -> bool {
        lock(&self.depth).registered
    }

    pub fn set_depth_registration(&self, registered: bool) -> Result<(), DeviceConfigError> {
        lock(&self.depth).set_registration(registered)
    }

    pub fn is_synchronized(&self) -> bool {
        lock(&self.depth).synchronized
    }

    pub fn set_frame_sync(&self, enabled: bool) -> Result<(), DeviceConfigError> {
        let mut depth = lock(&self.depth);
        if depth.synchronized == enabled {
            return Ok(());
        }
        depth
            .stream
            .generator
            .set_frame_sync(enabled)
            .map_err(|status| DeviceConfigError::new("FrameSync", enabled, status))?;
        depth.synchronized = enabled;
        Ok(())
    }

    pub fn cropping(&self) -> Option<Cropping> {
        lock(&self.depth).cropping
    }

    pub fn set_cropping(&self, cropping: Option<Cropping>) -> Result<(), DeviceConfigError> {
        let mut depth = lock(&self.depth);
        depth
            .stream
            .generator
            .set_cropping(cropping)
            .map_err(|status| DeviceConfigError::new("Cropping", format!("{cropping:?}"), status))?;
        depth.cropping = cropping;
        Ok(())
    }

    /// Start the image stream, delivering frames to `callback`.
    ///
    /// No-op if the image stream is already running.
    pub fn start_image(&self, callback: FrameCallback) -> Result<(), DeviceConfigError> {
        let mut depth = lock(&self.depth);
        let mut image = lock(&self.image);
        if image.is_running() {
            return Ok(());
        }

        if !self.cycle_registration_on_start || !depth.stream.is_running() {
            return image.start(callback);
        }

        if depth.registered {
            depth.set_registration(false)?;
            depth.set_registration(true)?;
            depth.set_registration(false)?;
            image.start(callback)?;
            depth.set_registration(true)
        } else {
            depth.set_registration(true)?;
            depth.set_registration(false)?;
            image.start(callback)
        }
    }

    /// Start the depth stream, delivering frames to `callback`.
    ///
    /// No-op if the depth stream is already running.
    pub fn start_depth(&self, callback: FrameCallback) -> Result<(), DeviceConfigError> {
        let mut depth = lock(&self.depth);
        if depth.stream.is_running() {
            return Ok(());
        }

        if self.cycle_registration_on_start && depth.registered {
            depth.set_registration(false)?;
            depth.stream.start(callback)?;
            depth.set_registration(true)
        } else {
            depth.stream.start(callback)
        }
    }

    /// Stop the image stream and drop its subscription. Safe when never started.
    pub fn stop_image(&self) -> Result<(), DeviceConfigError> {
        lock(&self.image).stop()
    }

    /// Stop the depth stream and drop its subscription. Safe when never started.
    pub fn stop_depth(&self) -> Result<(), DeviceConfigError> {
        lock(&self.depth).stream.stop()
    }

    /// Reset to {Stopped, Stopped, unregistered} and release both subscriptions.
    ///
    /// Never fails; SDK errors along the way are logged. Calling it again is a no-op.
    pub fn teardown(&self) {
        {
            let mut depth = lock(&self.depth);
            if let Err(e) = depth.set_registration(false) {
                log::warn!("Error disabling depth registration during teardown: {}", e);
                depth.registered = false;
            }
            if depth.synchronized {
                if let Err(e) = depth.stream.generator.set_frame_sync(false) {
                    log::warn!("Error disabling frame sync during teardown: {}", e);
                }
                depth.synchronized = false;
            }
            depth.stream.release();
        }

        lock(&self.image).release();
    }
}

/// Lock ignoring poisoning; guarded state is plain data that a panicking
/// frame callback cannot leave half-written.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
