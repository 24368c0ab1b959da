//! Recompute orchestration
//!
//! Every trigger (item batch, zoom, pan end, resize, radius or algorithm
//! change, explicit request) bumps a generation counter and drops a request
//! into a single-slot channel. One worker task drains that slot, so at most
//! one pass runs at a time and triggers that pile up while it runs coalesce
//! into the newest. A pass whose generation is no longer current is
//! abandoned and never reaches the render dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::{ClusterError, Result, check_radius};
use super::item_set::{ItemSet, ItemStore};
use super::pass::{Algorithm, PassResult, run_pass};
use super::point::{Cluster, Coordinate};
use super::projection::Viewport;
use super::signal::SubscriptionId;

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub viewport: Viewport,
    /// Clustering radius in pixels
    pub radius: f64,
    pub algorithm: Algorithm,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            radius: 40.0,
            algorithm: Algorithm::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        check_radius(self.radius).map(|_| ())
    }
}

/// Full result of one delivered pass
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFrame {
    pub generation: u64,
    pub viewport: Viewport,
    pub radius: f64,
    pub algorithm: Algorithm,
    pub clusters: Vec<Cluster>,
}

/// Host side that turns clusters into visuals
///
/// Called once per delivered pass, from the engine's worker task, with the
/// complete cluster list. Single-member clusters are meant to be drawn as
/// the item itself, others as an aggregate (see [`Cluster::kind`]).
pub trait RenderDispatch: Send + Sync + 'static {
    fn deliver(&self, frame: &ClusterFrame);
}

impl<F> RenderDispatch for F
where
    F: Fn(&ClusterFrame) + Send + Sync + 'static,
{
    fn deliver(&self, frame: &ClusterFrame) {
        self(frame)
    }
}

/// Identifies the pass requested by one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassTicket(u64);

impl PassTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// What waiting on a ticket yields
///
/// If newer triggers superseded the awaited pass, this is the outcome of the
/// newest pass that completed.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Delivered(Arc<ClusterFrame>),
    /// Zoom was beyond the clusterable range; nothing was delivered and the
    /// last frame stays current
    Skipped { generation: u64 },
}

/// Why a pass was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Explicit,
    ItemsChanged,
    Viewport,
    Zoom,
    PanEnd,
    Resize,
    Radius,
    Algorithm,
}

#[derive(Debug, Clone)]
enum Status {
    Delivered(Arc<ClusterFrame>),
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
struct Completion {
    generation: u64,
    status: Status,
}

struct PassRequest<T> {
    generation: u64,
    trigger: Trigger,
    viewport: Viewport,
    radius: f64,
    algorithm: Algorithm,
    items: Arc<ItemSet<T>>,
}

impl<T> Clone for PassRequest<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            trigger: self.trigger,
            viewport: self.viewport,
            radius: self.radius,
            algorithm: self.algorithm,
            items: Arc::clone(&self.items),
        }
    }
}

/// One clustering pass over a snapshot; panics surface as failed passes
pub(crate) type PassFn<T> =
    fn(&ItemSet<T>, &Viewport, f64, Algorithm, &dyn Fn() -> bool) -> PassResult;

/// Trigger side, shared with the item store listener
struct Scheduler<T> {
    items: Arc<ItemStore<T>>,
    settings: Mutex<EngineConfig>,
    generation: Arc<AtomicU64>,
    requests: watch::Sender<Option<PassRequest<T>>>,
}

impl<T> Scheduler<T> {
    /// Applies `change` and requests a pass if it reports a modification
    fn update<F>(&self, trigger: Trigger, change: F) -> Option<PassTicket>
    where
        F: FnOnce(&mut EngineConfig) -> bool,
    {
        let mut settings = self.settings.lock();
        if !change(&mut *settings) {
            return None;
        }
        Some(self.schedule(&settings, trigger))
    }

    fn request(&self, trigger: Trigger) -> PassTicket {
        let settings = self.settings.lock();
        self.schedule(&settings, trigger)
    }

    // Called with the settings lock held so generations are sent in order
    fn schedule(&self, settings: &EngineConfig, trigger: Trigger) -> PassTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let request = PassRequest {
            generation,
            trigger,
            viewport: settings.viewport,
            radius: settings.radius,
            algorithm: settings.algorithm,
            items: self.items.snapshot(),
        };
        debug!(generation, ?trigger, items = request.items.len(), "pass requested");
        self.requests.send_replace(Some(request));
        PassTicket(generation)
    }
}

/// ClusterEngine keeps the cluster set in step with items and viewport
pub struct ClusterEngine<T> {
    scheduler: Arc<Scheduler<T>>,
    completions: watch::Receiver<Completion>,
    last_frame: Arc<RwLock<Option<Arc<ClusterFrame>>>>,
    subscription: SubscriptionId,
    worker: JoinHandle<()>,
}

impl<T> ClusterEngine<T>
where
    T: Send + Sync + 'static,
{
    /// Starts the engine's worker on `runtime`
    ///
    /// No pass runs until something triggers one.
    pub fn new<D: RenderDispatch>(
        items: Arc<ItemStore<T>>,
        dispatch: D,
        runtime: &Handle,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::with_pass(items, dispatch, runtime, config, run_pass::<T>)
    }

    pub(crate) fn with_pass<D: RenderDispatch>(
        items: Arc<ItemStore<T>>,
        dispatch: D,
        runtime: &Handle,
        config: EngineConfig,
        pass: PassFn<T>,
    ) -> Result<Self> {
        config.validate()?;

        let generation = Arc::new(AtomicU64::new(0));
        let (requests, request_rx) = watch::channel(None);
        let (completion_tx, completions) = watch::channel(Completion {
            generation: 0,
            status: Status::Skipped,
        });
        let last_frame = Arc::new(RwLock::new(None));

        let scheduler = Arc::new(Scheduler {
            items: Arc::clone(&items),
            settings: Mutex::new(config),
            generation: Arc::clone(&generation),
            requests,
        });

        let listener = Arc::downgrade(&scheduler);
        let subscription = items.subscribe(move |_| {
            if let Some(scheduler) = listener.upgrade() {
                scheduler.request(Trigger::ItemsChanged);
            }
        });

        let worker = runtime.spawn(run_worker(
            request_rx,
            generation,
            completion_tx,
            Arc::clone(&last_frame),
            Arc::new(dispatch),
            pass,
        ));

        Ok(Self {
            scheduler,
            completions,
            last_frame,
            subscription,
            worker,
        })
    }
}

impl<T> ClusterEngine<T> {
    pub fn items(&self) -> &Arc<ItemStore<T>> {
        &self.scheduler.items
    }

    pub fn config(&self) -> EngineConfig {
        *self.scheduler.settings.lock()
    }

    pub fn viewport(&self) -> Viewport {
        self.scheduler.settings.lock().viewport
    }

    pub fn radius(&self) -> f64 {
        self.scheduler.settings.lock().radius
    }

    pub fn algorithm(&self) -> Algorithm {
        self.scheduler.settings.lock().algorithm
    }

    /// Most recently delivered frame
    pub fn last_frame(&self) -> Option<Arc<ClusterFrame>> {
        self.last_frame.read().clone()
    }

    /// Ticket of the newest requested pass, if any was requested
    pub fn latest_ticket(&self) -> Option<PassTicket> {
        match self.scheduler.generation.load(Ordering::Acquire) {
            0 => None,
            generation => Some(PassTicket(generation)),
        }
    }

    /// Requests a pass with the current settings and waits for it
    pub async fn recluster(&self) -> Result<PassOutcome> {
        let ticket = self.scheduler.request(Trigger::Explicit);
        self.wait(ticket).await
    }

    pub fn set_viewport(&self, viewport: Viewport) -> Option<PassTicket> {
        self.scheduler.update(Trigger::Viewport, |s| {
            let changed = s.viewport != viewport;
            s.viewport = viewport;
            changed
        })
    }

    pub fn resize(&self, width_px: u32, height_px: u32) -> Option<PassTicket> {
        self.scheduler.update(Trigger::Resize, |s| {
            let resized = s.viewport.with_size(width_px, height_px);
            let changed = s.viewport != resized;
            s.viewport = resized;
            changed
        })
    }

    pub fn set_zoom(&self, zoom: u8) -> Option<PassTicket> {
        self.scheduler.update(Trigger::Zoom, |s| {
            let changed = s.viewport.zoom != zoom;
            s.viewport.zoom = zoom;
            changed
        })
    }

    /// Records where a pan gesture came to rest
    pub fn pan_end(&self, center: Coordinate) -> Option<PassTicket> {
        self.scheduler.update(Trigger::PanEnd, |s| {
            let changed = s.viewport.center != center;
            s.viewport.center = center;
            changed
        })
    }

    /// Rejects non-positive radii, keeping the current one
    pub fn set_radius(&self, radius: f64) -> Result<Option<PassTicket>> {
        if let Err(err) = check_radius(radius) {
            warn!(radius, current = self.radius(), "rejected cluster radius");
            return Err(err);
        }
        Ok(self.scheduler.update(Trigger::Radius, |s| {
            let changed = s.radius != radius;
            s.radius = radius;
            changed
        }))
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) -> Option<PassTicket> {
        self.scheduler.update(Trigger::Algorithm, |s| {
            let changed = s.algorithm != algorithm;
            s.algorithm = algorithm;
            changed
        })
    }

    /// Waits until the pass for `ticket`, or a newer one, has completed
    pub async fn wait(&self, ticket: PassTicket) -> Result<PassOutcome> {
        let mut completions = self.completions.clone();
        let completion = completions
            .wait_for(|c| c.generation >= ticket.0)
            .await
            .map_err(|_| ClusterError::EngineStopped)?
            .clone();

        match completion.status {
            Status::Delivered(frame) => Ok(PassOutcome::Delivered(frame)),
            Status::Skipped => Ok(PassOutcome::Skipped {
                generation: completion.generation,
            }),
            Status::Failed(reason) => Err(ClusterError::PassFailed(reason)),
        }
    }

    /// Waits for the newest requested pass; `None` if none was ever requested
    pub async fn settled(&self) -> Result<Option<PassOutcome>> {
        match self.latest_ticket() {
            Some(ticket) => self.wait(ticket).await.map(Some),
            None => Ok(None),
        }
    }
}

impl<T> Drop for ClusterEngine<T> {
    fn drop(&mut self) {
        self.scheduler.items.unsubscribe(self.subscription);
        self.worker.abort();
    }
}

async fn run_worker<T>(
    mut requests: watch::Receiver<Option<PassRequest<T>>>,
    generation: Arc<AtomicU64>,
    completions: watch::Sender<Completion>,
    last_frame: Arc<RwLock<Option<Arc<ClusterFrame>>>>,
    dispatch: Arc<dyn RenderDispatch>,
    run: PassFn<T>,
) where
    T: Send + Sync + 'static,
{
    while requests.changed().await.is_ok() {
        let Some(request) = requests.borrow_and_update().clone() else {
            continue;
        };
        let pass = request.generation;

        let latest = Arc::clone(&generation);
        let job = request.clone();
        let result = tokio::task::spawn_blocking(move || {
            let is_stale = || latest.load(Ordering::Acquire) != pass;
            run(&job.items, &job.viewport, job.radius, job.algorithm, &is_stale)
        })
        .await;

        let superseded = || {
            let stale = generation.load(Ordering::Acquire) != pass;
            if stale {
                debug!(generation = pass, "pass superseded, result dropped");
            }
            stale
        };
        if superseded() {
            continue;
        }

        let status = match result {
            Ok(PassResult::Clusters(clusters)) => {
                let frame = Arc::new(ClusterFrame {
                    generation: pass,
                    viewport: request.viewport,
                    radius: request.radius,
                    algorithm: request.algorithm,
                    clusters,
                });
                // Checked again right before publishing
                if superseded() {
                    continue;
                }
                *last_frame.write() = Some(Arc::clone(&frame));
                debug!(
                    generation = pass,
                    trigger = ?request.trigger,
                    clusters = frame.clusters.len(),
                    "delivering clusters"
                );
                dispatch.deliver(&frame);
                Status::Delivered(frame)
            }
            Ok(PassResult::Skipped) => Status::Skipped,
            Ok(PassResult::Cancelled) => continue,
            Err(err) => {
                warn!(generation = pass, error = %err, "clustering pass failed");
                Status::Failed(err.to_string())
            }
        };

        completions.send_replace(Completion {
            generation: pass,
            status,
        });
    }
}
