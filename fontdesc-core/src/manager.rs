//! Index lifecycle: background population and waiting queries (made by FontLab https://www.fontlab.com/)
//!
//! Scans and clears run on a dedicated worker pool under the index write
//! lock. Each submission moves the population phase to
//! [`IndexState::Scanning`] before it is queued, and queries wait until no
//! submission is outstanding, so a query never observes a half-built index.

use std::collections::BTreeSet;
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};
#[cfg(feature = "fontations")]
use std::sync::OnceLock;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::descriptor::FontDescriptor;
use crate::index::{FontIndex, IndexStats};
use crate::parser::FontParser;
use crate::query::DescriptorQuery;
use crate::scanner::{DirectoryScanner, ScanReport};
use crate::sources::SystemFontType;
use crate::worker::{TaskHandle, TaskPool};

/// Population phase of the managed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexState {
    /// Nothing loaded (fresh, or cleared).
    Empty,
    /// A scan or clear is queued or running.
    Scanning,
    /// The last scan finished.
    Ready,
}

#[derive(Debug)]
struct Phase {
    state: IndexState,
    outstanding: usize,
}

#[derive(Debug)]
struct PhaseGate {
    phase: Mutex<Phase>,
    settled: Condvar,
}

impl PhaseGate {
    fn new() -> Self {
        Self {
            phase: Mutex::new(Phase {
                state: IndexState::Empty,
                outstanding: 0,
            }),
            settled: Condvar::new(),
        }
    }

    fn state(&self) -> IndexState {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner).state
    }

    fn begin(self: &Arc<Self>, settles_to: IndexState) -> PhaseTicket {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        phase.outstanding += 1;
        phase.state = IndexState::Scanning;
        PhaseTicket {
            gate: Arc::clone(self),
            settles_to,
        }
    }

    fn wait_settled(&self) -> IndexState {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        while phase.outstanding > 0 {
            phase = self
                .settled
                .wait(phase)
                .unwrap_or_else(PoisonError::into_inner);
        }
        phase.state
    }
}

/// Marks one submitted mutation; settles the gate when dropped.
struct PhaseTicket {
    gate: Arc<PhaseGate>,
    settles_to: IndexState,
}

impl Drop for PhaseTicket {
    fn drop(&mut self) {
        let mut phase = self.gate.phase.lock().unwrap_or_else(PoisonError::into_inner);
        phase.outstanding = phase.outstanding.saturating_sub(1);
        if phase.outstanding == 0 {
            phase.state = self.settles_to;
            self.gate.settled.notify_all();
        }
    }
}

/// Owns one [`FontIndex`], keeps it populated and answers queries against it.
pub struct IndexManager {
    config: IndexConfig,
    index: Arc<RwLock<FontIndex>>,
    scanner: DirectoryScanner,
    gate: Arc<PhaseGate>,
    scan_pool: TaskPool,
    query_pool: TaskPool,
}

impl std::fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl IndexManager {
    /// Build the manager and queue the initial scan of `config.font_dir`.
    pub fn new(config: IndexConfig, parser: Arc<dyn FontParser>) -> Result<Self> {
        let manager = Self {
            scan_pool: TaskPool::new(config.workers)?,
            query_pool: TaskPool::new(config.query_workers)?,
            scanner: DirectoryScanner::new(parser),
            index: Arc::new(RwLock::new(FontIndex::new())),
            gate: Arc::new(PhaseGate::new()),
            config,
        };
        manager.trigger_scan();
        Ok(manager)
    }

    /// Manager backed by the read-fonts parser.
    #[cfg(feature = "fontations")]
    pub fn with_opentype_parser(config: IndexConfig) -> Result<Self> {
        Self::new(config, Arc::new(crate::parser::OpenTypeParser))
    }

    /// Process-wide manager, created on first use from the default config
    /// plus environment overrides.
    #[cfg(feature = "fontations")]
    pub fn shared() -> Result<&'static IndexManager> {
        static SHARED: OnceLock<IndexManager> = OnceLock::new();
        static SHARED_INIT: Mutex<()> = Mutex::new(());

        if let Some(manager) = SHARED.get() {
            return Ok(manager);
        }
        let _init = SHARED_INIT.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(manager) = SHARED.get() {
            return Ok(manager);
        }
        let config = IndexConfig::default().with_env_overrides()?;
        let manager = Self::with_opentype_parser(config)?;
        Ok(SHARED.get_or_init(|| manager))
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn state(&self) -> IndexState {
        self.gate.state()
    }

    /// Queue a rescan of the configured directory and the stylish font list.
    pub fn trigger_scan(&self) -> TaskHandle<ScanReport> {
        let ticket = self.gate.begin(IndexState::Ready);
        let index = Arc::clone(&self.index);
        let scanner = self.scanner.clone();
        let dir = self.config.font_dir.clone();
        let stylish = self.config.stylish_config.clone();
        info!(dir = %dir.display(), "font scan queued");

        self.scan_pool.submit(move || {
            let _ticket = ticket;
            let mut guard = index.write().unwrap_or_else(PoisonError::into_inner);
            let report = scanner.scan_directory(&dir, &mut guard);
            guard.set_stylish(scanner.load_font_list(&stylish));
            report
        })
    }

    /// Queue removal of every indexed descriptor. Does not rescan.
    pub fn clear_font_file_cache(&self) -> TaskHandle<()> {
        let ticket = self.gate.begin(IndexState::Empty);
        let index = Arc::clone(&self.index);
        info!("font cache clear queued");

        self.scan_pool.submit(move || {
            let _ticket = ticket;
            index.write().unwrap_or_else(PoisonError::into_inner).clear();
            debug!("font cache cleared");
        })
    }

    /// Block until no scan or clear is outstanding.
    pub fn wait_ready(&self) -> IndexState {
        self.gate.wait_settled()
    }

    /// Wait for pending population, then return every matching descriptor.
    pub fn match_query(&self, query: &DescriptorQuery) -> Vec<FontDescriptor> {
        run_match(&self.gate, &self.index, query)
    }

    /// Run the match off the calling thread.
    pub fn match_async(&self, query: DescriptorQuery) -> TaskHandle<Vec<FontDescriptor>> {
        let gate = Arc::clone(&self.gate);
        let index = Arc::clone(&self.index);
        self.query_pool
            .submit(move || run_match(&gate, &index, &query))
    }

    /// Run the match off the calling thread and hand the result to `notify`.
    pub fn match_with_callback<F>(&self, query: DescriptorQuery, notify: F) -> TaskHandle<()>
    where
        F: FnOnce(Vec<FontDescriptor>) + Send + 'static,
    {
        let gate = Arc::clone(&self.gate);
        let index = Arc::clone(&self.index);
        self.query_pool
            .submit(move || notify(run_match(&gate, &index, &query)))
    }

    /// Full names from the sources selected by `kind`. Asking for installed
    /// fonts re-reads the install config first.
    pub fn system_font_list(&self, kind: SystemFontType) -> BTreeSet<String> {
        if kind.sources().contains(SystemFontType::INSTALLED) {
            self.read_with_fresh_installed(|index| index.font_list(kind))
        } else {
            self.read_settled(|index| index.font_list(kind))
        }
    }

    /// Scanned faces first, then stylish fonts, then installed fonts (after
    /// re-reading the install config).
    pub fn descriptor_by_name(&self, full_name: &str) -> Option<FontDescriptor> {
        if full_name.is_empty() {
            info!("empty full name provided");
            return None;
        }
        self.read_with_fresh_installed(|index| index.lookup_full_name(full_name).cloned())
    }

    pub fn stats(&self) -> IndexStats {
        self.read_settled(FontIndex::stats)
    }

    fn read_settled<T>(&self, read: impl FnOnce(&FontIndex) -> T) -> T {
        self.gate.wait_settled();
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        read(&guard)
    }

    fn read_with_fresh_installed<T>(&self, read: impl FnOnce(&FontIndex) -> T) -> T {
        self.gate.wait_settled();
        let installed = self.scanner.load_font_list(&self.config.install_config);
        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        guard.set_installed(installed);
        read(&guard)
    }
}

fn run_match(
    gate: &PhaseGate,
    index: &RwLock<FontIndex>,
    query: &DescriptorQuery,
) -> Vec<FontDescriptor> {
    gate.wait_settled();
    let guard = index.read().unwrap_or_else(PoisonError::into_inner);
    guard.match_query(query).into_iter().cloned().collect()
}
