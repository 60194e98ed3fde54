//! A bound panel: encoder, transport, surface and the flush scheduler.
//!
//! Writers report damage through `&Device` from any context. Flushes are
//! serialized: a trigger that arrives while one is running is folded into it
//! (the running flush drains once more), and the deferred timer is armed at
//! most once per burst of writes.
//!
//! ```text
//!   on_surface_write ──► mark_dirty ──► arm timer (defer_ms)
//!                                            │
//!   flush_now / on_memory_write ◄── on_timer ┘
//!        │
//!        ▼
//!   Idle ──► Flushing: snapshot, address window, WRITE_MEMORY_START ──► Idle
//! ```

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use spin::Mutex;

use crate::convert::{rgb565_copy, xrgb8888_to_rgb565};
use crate::dcs::{self, AddressMode, Rotation};
use crate::dirty::DirtyTracker;
use crate::encoder::{run_sequence, Encoder, ProtocolEncoder, Variant};
use crate::error::Error;
use crate::init::run_init_words;
use crate::mipi::MipiDbi;
use crate::panel::Panel;
use crate::rect::Rect;
use crate::surface::{Pixels, Surface};
use crate::transport::Transport;

/// Device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Delay between the first unflushed write and the deferred flush
    pub defer_ms: u32,
    /// Re-arm the deferred timer on every write instead of only the first
    pub restart_timer_on_write: bool,
    /// Address and send only the damaged rectangle instead of the whole frame
    pub partial_updates: bool,
    /// `SET_ADDRESS_MODE` sent after initialization, overriding the panel's
    /// rotation table
    pub address_mode: Option<AddressMode>,
    /// Rotation looked up in the panel's rotation table
    pub rotation: Rotation,
    /// BGR subpixel order
    pub bgr: bool,
    /// fbtft-style init words replacing the panel's init table; see
    /// [`crate::init`]
    pub init_words: Option<&'static [u32]>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Full-frame flushes, 50 ms deferral.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            defer_ms: 50,
            restart_timer_on_write: false,
            partial_updates: false,
            address_mode: None,
            rotation: Rotation::Deg0,
            bgr: false,
            init_words: None,
        }
    }

    /// Set the deferral delay.
    #[must_use]
    pub const fn with_defer_ms(mut self, defer_ms: u32) -> Self {
        self.defer_ms = defer_ms;
        self
    }

    /// Re-arm the deferred timer on every write.
    #[must_use]
    pub const fn with_restart_timer_on_write(mut self, restart: bool) -> Self {
        self.restart_timer_on_write = restart;
        self
    }

    /// Send only damaged rectangles.
    #[must_use]
    pub const fn with_partial_updates(mut self, partial: bool) -> Self {
        self.partial_updates = partial;
        self
    }

    /// Override the address mode sent after initialization.
    #[must_use]
    pub const fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = Some(mode);
        self
    }

    /// Select a rotation from the panel's rotation table.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Use BGR subpixel order.
    #[must_use]
    pub const fn with_bgr(mut self, bgr: bool) -> Self {
        self.bgr = bgr;
        self
    }

    /// Initialize with `words` instead of the panel's tables. No address mode
    /// is sent afterwards.
    #[must_use]
    pub const fn with_init_words(mut self, words: &'static [u32]) -> Self {
        self.init_words = Some(words);
        self
    }
}

/// Single-shot timer owned by a device.
///
/// When it fires the host calls [`Device::on_timer`].
pub trait DeferredTimer {
    /// Arm the timer to fire once after `ms` milliseconds.
    fn schedule(&mut self, ms: u32);

    /// Disarm the timer. Does nothing if it is not armed.
    fn cancel(&mut self);
}

/// Timer for hosts that flush explicitly and never defer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTimer;

impl DeferredTimer for NoTimer {
    fn schedule(&mut self, _ms: u32) {}

    fn cancel(&mut self) {}
}

/// Result of a flush request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    /// The rectangle was sent to the panel
    Flushed(Rect),
    /// Nothing was pending
    Clean,
    /// Another flush is running and will drain the damage
    Busy,
    /// The device is disabled; damage stays pending
    Disabled,
}

/// Everything a device owned, handed back by [`Device::shutdown`].
#[derive(Debug)]
pub struct Parts<T, D, S, TM> {
    /// The transport
    pub transport: T,
    /// The delay provider
    pub delay: D,
    /// The surface, if one was attached
    pub surface: Option<S>,
    /// The deferred timer, cancelled
    pub timer: TM,
}

struct Engine<T, D> {
    encoder: Encoder,
    transport: T,
    delay: D,
    buf: Vec<u16>,
}

/// A panel bound to a transport.
pub struct Device<T, D, S, TM> {
    name: &'static str,
    width: u16,
    height: u16,
    config: Config,
    engine: Mutex<Engine<T, D>>,
    surface: Mutex<Option<S>>,
    timer: Mutex<TM>,
    tracker: DirtyTracker,
    enabled: AtomicBool,
    armed: AtomicBool,
    format_reported: AtomicBool,
}

impl<T, D, S, TM> Device<T, D, S, TM>
where
    T: Transport,
    D: DelayNs,
    S: Surface,
    TM: DeferredTimer,
{
    /// Bring up a keidei panel: acquire lines, reset, initialize.
    ///
    /// The device starts disabled and without a surface.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for keidei v1.0, otherwise the first line
    /// acquisition or transport failure.
    pub fn attach(
        variant: Variant,
        transport: T,
        delay: D,
        timer: TM,
        config: Config,
    ) -> Result<Self, Error<T::Error>> {
        info!("attaching {}", variant.name());
        let encoder = variant.encoder();
        let Some(panel) = variant.panel() else {
            error!("{} is not supported", variant.name());
            return Err(Error::Unsupported);
        };
        Self::bring_up(encoder, panel, transport, delay, timer, config)
    }

    /// Bring up a generic DBI panel over the canonical 4-wire encoder.
    ///
    /// # Errors
    ///
    /// The first line acquisition or transport failure.
    pub fn attach_dbi(
        panel: &'static Panel,
        encoder: MipiDbi,
        transport: T,
        delay: D,
        timer: TM,
        config: Config,
    ) -> Result<Self, Error<T::Error>> {
        Self::attach_panel(panel, encoder, transport, delay, timer, config)
    }

    /// Bring up `panel` with any encoder, e.g. a
    /// [`Piscreen`](crate::piscreen::Piscreen) board.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInit`] for bad [`Config::init_words`], otherwise the
    /// first line acquisition or transport failure.
    pub fn attach_panel(
        panel: &'static Panel,
        encoder: impl Into<Encoder>,
        transport: T,
        delay: D,
        timer: TM,
        config: Config,
    ) -> Result<Self, Error<T::Error>> {
        info!("attaching {}", panel.name);
        Self::bring_up(encoder.into(), panel, transport, delay, timer, config)
    }

    fn bring_up(
        encoder: Encoder,
        panel: &'static Panel,
        mut transport: T,
        mut delay: D,
        timer: TM,
        config: Config,
    ) -> Result<Self, Error<T::Error>> {
        encoder.acquire(&mut transport)?;

        run_sequence(&encoder, &mut transport, &mut delay, encoder.reset_sequence()).map_err(
            |e| {
                error!("Failed to reset ({})", e.kind());
                e
            },
        )?;
        let custom = match config.init_words {
            Some(words) => run_init_words(&encoder, &mut transport, &mut delay, words)
                .map_err(|e| {
                    error!("Failed to run init words ({})", e.kind());
                    e
                })?,
            None => false,
        };
        if !custom {
            Self::init_panel(&encoder, panel, &mut transport, &mut delay, &config).map_err(
                |e| {
                    error!("Failed to initialize ({})", e.kind());
                    e
                },
            )?;
        }

        info!("{} ready, {}x{}", panel.name, panel.width, panel.height);
        Ok(Self {
            name: panel.name,
            width: panel.width,
            height: panel.height,
            config,
            engine: Mutex::new(Engine {
                encoder,
                transport,
                delay,
                buf: Vec::new(),
            }),
            surface: Mutex::new(None),
            timer: Mutex::new(timer),
            tracker: DirtyTracker::new(),
            enabled: AtomicBool::new(false),
            armed: AtomicBool::new(false),
            format_reported: AtomicBool::new(false),
        })
    }

    fn init_panel(
        encoder: &Encoder,
        panel: &Panel,
        transport: &mut T,
        delay: &mut D,
        config: &Config,
    ) -> Result<(), Error<T::Error>> {
        run_sequence(encoder, transport, delay, panel.init)?;
        let address_mode = config
            .address_mode
            .or_else(|| panel.address_mode(config.rotation, config.bgr));
        if let Some(mode) = address_mode {
            encoder.command(transport, dcs::SET_ADDRESS_MODE, &[mode.bits()])?;
        }
        run_sequence(encoder, transport, delay, panel.finish)
    }

    /// Panel name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Panel size in pixels.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// The configuration the device was attached with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The encoder selected at attach.
    pub fn encoder(&self) -> Encoder {
        self.engine.lock().encoder
    }

    /// The pending-damage tracker.
    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    /// Returns `true` between [`Device::enable`] and [`Device::disable`].
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Attach `surface`, returning the previous one.
    ///
    /// Nothing is marked dirty; enabling the device or reporting damage
    /// makes the new content visible.
    pub fn set_surface(&self, surface: S) -> Option<S> {
        debug!("surface {}x{} attached", surface.width(), surface.height());
        self.surface.lock().replace(surface)
    }

    /// Detach and return the surface.
    pub fn detach_surface(&self) -> Option<S> {
        self.surface.lock().take()
    }

    /// Start flushing. The whole surface is marked dirty and flushed now.
    ///
    /// # Errors
    ///
    /// See [`Device::flush_now`].
    pub fn enable(&self) -> Result<FlushOutcome, Error<T::Error>> {
        debug!("enable");
        self.enabled.store(true, Ordering::Release);
        let full = match self.surface.lock().as_ref() {
            Some(surface) => Rect::full(surface.width(), surface.height()),
            None => return Ok(FlushOutcome::Clean),
        };
        self.tracker.mark_dirty(full);
        self.flush_now()
    }

    /// Stop flushing. Damage keeps accumulating.
    pub fn disable(&self) {
        debug!("disable");
        self.enabled.store(false, Ordering::Release);
    }

    /// Report damage from a drawing operation and arm the deferred flush.
    pub fn on_surface_write(&self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.tracker.mark_dirty(rect);
        self.arm_timer();
    }

    /// Report a write to the surface memory range `first..=last` (bytes) and
    /// flush now. The damage covers every touched row.
    ///
    /// # Errors
    ///
    /// See [`Device::flush_now`].
    pub fn on_memory_write(
        &self,
        first: usize,
        last: usize,
    ) -> Result<FlushOutcome, Error<T::Error>> {
        let rect = match self.surface.lock().as_ref() {
            Some(surface) => {
                let bpp = match surface.pixels() {
                    Pixels::Rgb565(_) => 2,
                    Pixels::Xrgb8888(_) | Pixels::Other(_) => 4,
                };
                let line_length = usize::from(surface.width()) * bpp;
                Rect::from_byte_range(first, last, line_length, surface.width(), surface.height())
            }
            None => return Err(Error::NoSurface),
        };
        self.tracker.mark_dirty(rect);
        self.flush_now()
    }

    /// Run `f` on the surface, then report the damage it accumulated.
    ///
    /// Returns `None` if no surface is attached.
    pub fn draw<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let (result, damage) = {
            let mut surface = self.surface.lock();
            let surface = surface.as_mut()?;
            let result = f(surface);
            (result, surface.take_damage())
        };
        self.on_surface_write(damage);
        Some(result)
    }

    /// Called by the host when the deferred timer fires.
    ///
    /// # Errors
    ///
    /// See [`Device::flush_now`].
    pub fn on_timer(&self) -> Result<FlushOutcome, Error<T::Error>> {
        self.armed.store(false, Ordering::Release);
        self.flush_now()
    }

    /// Flush pending damage now.
    ///
    /// If a flush is already running this returns [`FlushOutcome::Busy`] and
    /// the running flush drains once more before it returns.
    ///
    /// # Errors
    ///
    /// [`Error::NoSurface`], [`Error::InvalidFormat`] and
    /// [`Error::Allocation`] leave the damage pending. A transport failure
    /// drops the frame being sent; it is not retried.
    pub fn flush_now(&self) -> Result<FlushOutcome, Error<T::Error>> {
        if !self.tracker.try_begin_flush() {
            debug!("flush in progress");
            return Ok(FlushOutcome::Busy);
        }
        let mut flushed = Rect::EMPTY;
        loop {
            let result = self.flush_once();
            // `again` means the flush is still ours for another pass
            let mut again = self.tracker.end_flush();
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    while again {
                        again = self.tracker.end_flush();
                    }
                    return Err(err);
                }
            };
            match outcome {
                FlushOutcome::Flushed(rect) => flushed = flushed.union(rect),
                other if flushed.is_empty() && !again => return Ok(other),
                _ => {}
            }
            if !again {
                break;
            }
            debug!("flushing again");
        }
        if flushed.is_empty() {
            Ok(FlushOutcome::Clean)
        } else {
            Ok(FlushOutcome::Flushed(flushed))
        }
    }

    fn flush_once(&self) -> Result<FlushOutcome, Error<T::Error>> {
        if !self.is_enabled() {
            return Ok(FlushOutcome::Disabled);
        }

        let mut engine = self.engine.lock();
        let engine = &mut *engine;
        let swap = engine.encoder.pixel_byte_swap(&engine.transport);

        let region = {
            let surface = self.surface.lock();
            let Some(surface) = surface.as_ref() else {
                warn!("flush without a surface");
                return Err(Error::NoSurface);
            };
            let stride = usize::from(surface.width());
            let width = surface.width().min(self.width);
            let height = surface.height().min(self.height);
            let pixels = surface.pixels();
            if let Pixels::Other(code) = pixels {
                if !self.format_reported.swap(true, Ordering::Relaxed) {
                    error!("pixel format {:#x} is not supported", code);
                }
                return Err(Error::InvalidFormat);
            }

            let estimate = if self.config.partial_updates {
                self.tracker.peek().clip(width, height)
            } else {
                Rect::full(width, height)
            };
            reserve(&mut engine.buf, estimate.pixel_count())?;

            let snapshot = self.tracker.take_snapshot_and_reset();
            if snapshot.is_empty() {
                return Ok(FlushOutcome::Clean);
            }
            let region = if self.config.partial_updates {
                snapshot.clip(width, height)
            } else {
                Rect::full(width, height)
            };
            if region.is_empty() {
                return Ok(FlushOutcome::Clean);
            }
            if let Err(e) = reserve(&mut engine.buf, region.pixel_count()) {
                self.tracker.restore(snapshot);
                return Err(e);
            }
            if !convert_region(pixels, stride, region, swap, &mut engine.buf) {
                error!("surface memory is smaller than its size");
                self.tracker.restore(snapshot);
                return Err(Error::InvalidFormat);
            }
            region
        };

        debug!(
            "flush x1={}, x2={}, y1={}, y2={}",
            region.x1, region.x2, region.y1, region.y2
        );
        send_region(engine, region).map_err(|e| {
            error!("flush failed: {}", e.kind());
            e
        })?;
        Ok(FlushOutcome::Flushed(region))
    }

    /// Returns `true` if the panel reports it is on. Always `false` when the
    /// transport cannot read.
    pub fn display_is_on(&self) -> bool {
        dcs::display_is_on(&mut self.engine.lock().transport)
    }

    /// Log the panel's diagnostic registers at debug level.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] when the transport cannot read, or the read
    /// failure.
    pub fn dump_registers(&self) -> Result<(), Error<T::Error>> {
        dcs::dump_registers(&mut self.engine.lock().transport)
    }

    /// Send a raw command through the device's encoder.
    ///
    /// # Errors
    ///
    /// The transport failure, or [`Error::Unsupported`].
    pub fn command(&self, cmd: u8, params: &[u8]) -> Result<(), Error<T::Error>> {
        let mut engine = self.engine.lock();
        let Engine {
            encoder, transport, ..
        } = &mut *engine;
        encoder.command(transport, cmd, params)
    }

    /// Block on the device's delay provider.
    pub fn delay_ms(&self, ms: u32) {
        self.engine.lock().delay.delay_ms(ms);
    }

    /// Stop flushing, cancel the deferred timer and hand back everything the
    /// device owned.
    pub fn shutdown(self) -> Parts<T, D, S, TM> {
        info!("{} shutdown", self.name);
        self.enabled.store(false, Ordering::Release);
        let mut timer = self.timer.into_inner();
        timer.cancel();
        let engine = self.engine.into_inner();
        Parts {
            transport: engine.transport,
            delay: engine.delay,
            surface: self.surface.into_inner(),
            timer,
        }
    }

    fn arm_timer(&self) {
        let mut timer = self.timer.lock();
        if self.config.restart_timer_on_write {
            timer.cancel();
            timer.schedule(self.config.defer_ms);
            self.armed.store(true, Ordering::Release);
        } else if !self.armed.swap(true, Ordering::AcqRel) {
            timer.schedule(self.config.defer_ms);
        }
    }
}

impl<T, D, S, TM> core::fmt::Debug for Device<T, D, S, TM> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("config", &self.config)
            .field("pending", &self.tracker.peek())
            .field("enabled", &self.enabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn reserve<E>(buf: &mut Vec<u16>, pixels: usize) -> Result<(), Error<E>> {
    buf.clear();
    buf.try_reserve(pixels).map_err(|_| {
        error!("failed to allocate {} pixels", pixels);
        Error::Allocation
    })
}

/// Convert the rows of `region` into `buf` as RGB565. Returns `false` if the
/// surface memory does not cover the region.
fn convert_region(
    pixels: Pixels<'_>,
    stride: usize,
    region: Rect,
    swap: bool,
    buf: &mut Vec<u16>,
) -> bool {
    let columns = usize::from(region.x1)..=usize::from(region.x2);
    for y in usize::from(region.y1)..=usize::from(region.y2) {
        let row = y * stride;
        let span = row + columns.start()..=row + columns.end();
        let start = buf.len();
        buf.resize(start + columns.clone().count(), 0);
        let out = &mut buf[start..];
        match pixels {
            Pixels::Xrgb8888(src) => match src.get(span) {
                Some(src) => xrgb8888_to_rgb565(src, out, swap),
                None => return false,
            },
            Pixels::Rgb565(src) => match src.get(span) {
                Some(src) => rgb565_copy(src, out, swap),
                None => return false,
            },
            Pixels::Other(_) => return false,
        }
    }
    true
}

fn send_region<T: Transport, D>(
    engine: &mut Engine<T, D>,
    region: Rect,
) -> Result<(), Error<T::Error>> {
    let Engine {
        encoder,
        transport,
        buf,
        ..
    } = engine;
    let [x1h, x1l] = region.x1.to_be_bytes();
    let [x2h, x2l] = region.x2.to_be_bytes();
    let [y1h, y1l] = region.y1.to_be_bytes();
    let [y2h, y2l] = region.y2.to_be_bytes();
    encoder.command(transport, dcs::SET_COLUMN_ADDRESS, &[x1h, x1l, x2h, x2l])?;
    encoder.command(transport, dcs::SET_PAGE_ADDRESS, &[y1h, y1l, y2h, y2l])?;
    encoder.write_memory(transport, buf)
}
