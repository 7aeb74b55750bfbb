//! Player status and general purpose registers
//!
//! The register bank is the shared state surface of the player: HDMV
//! programs, the playback pipeline and the UI all read and write it from
//! their own threads. Every access serializes through one mutex around the
//! register arrays; observer notifications are collected inside the critical
//! section but delivered only after it is released, in registration order,
//! so an observer may call straight back into the bank without deadlocking.
//!
//! PSR write policy is fixed per index: player-setting registers reject
//! program writes, masked registers accept only their settable bit
//! positions, and backup slots change exclusively through
//! [`RegisterBank::save_state`] / [`RegisterBank::restore_state`].

use std::fmt;
use std::sync::Arc;

use log::debug;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use parking_lot::Mutex;
use serde::Serialize;

use crate::{BdNavError, Result};

/// Number of player status registers
pub const PSR_COUNT: usize = 128;
/// Number of general purpose registers
pub const GPR_COUNT: usize = 4096;

/// Player status register names
///
/// Discriminants are the platform register numbers; indices not named here
/// are reserved (and writable as plain registers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[allow(missing_docs)]
pub enum PsrIndex {
    IgStreamId = 0,
    PrimaryAudioId = 1,
    PgPipStream = 2,
    AngleId = 3,
    TitleId = 4,
    Chapter = 5,
    Playlist = 6,
    Playitem = 7,
    /// Presentation time
    Time = 8,
    NavTimer = 9,
    SelectedButtonId = 10,
    MenuPageId = 11,
    Style = 12,
    Parental = 13,
    SecondaryAudioVideo = 14,
    AudioCap = 15,
    AudioLang = 16,
    PgAndSubLang = 17,
    MenuLang = 18,
    Country = 19,
    Region = 20,
    VideoCap = 29,
    /// Text subtitle capability
    TextCap = 30,
    /// Player profile and version
    ProfileVersion = 31,
    BackupPsr4 = 36,
    BackupPsr5 = 37,
    BackupPsr6 = 38,
    BackupPsr7 = 39,
    BackupPsr8 = 40,
    BackupPsr10 = 42,
    BackupPsr11 = 43,
    BackupPsr12 = 44,
}

/// Write policy of one PSR index, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PsrPolicy {
    /// Program-writable
    Writable,
    /// Player setting; rejected by `psr_write`, set via `psr_setting_write`
    ReadOnly,
    /// Only the mask bits are program-settable; others keep their value
    Masked(u32),
    /// Snapshot slot; changes only through save/restore
    Backup,
}

/// (backup slot, primary register) pairs used by save/restore, in
/// restore-event order
const BACKUP_PAIRS: [(usize, usize); 8] = [
    (PsrIndex::BackupPsr4 as usize, PsrIndex::TitleId as usize),
    (PsrIndex::BackupPsr5 as usize, PsrIndex::Chapter as usize),
    (PsrIndex::BackupPsr6 as usize, PsrIndex::Playlist as usize),
    (PsrIndex::BackupPsr7 as usize, PsrIndex::Playitem as usize),
    (PsrIndex::BackupPsr8 as usize, PsrIndex::Time as usize),
    (PsrIndex::BackupPsr10 as usize, PsrIndex::SelectedButtonId as usize),
    (PsrIndex::BackupPsr11 as usize, PsrIndex::MenuPageId as usize),
    (PsrIndex::BackupPsr12 as usize, PsrIndex::Style as usize),
];

/// Mandated non-zero register values applied at construction
const PSR_DEFAULTS: [(usize, u32); 19] = [
    (PsrIndex::IgStreamId as usize, 1),
    (PsrIndex::PrimaryAudioId as usize, 0xFF),
    (PsrIndex::PgPipStream as usize, 0x0FFF_0FFF),
    (PsrIndex::AngleId as usize, 1),
    (PsrIndex::TitleId as usize, 0xFFFF),
    (PsrIndex::Chapter as usize, 0xFFFF),
    (PsrIndex::SelectedButtonId as usize, 0xFFFF),
    (PsrIndex::Style as usize, 0xFF),
    (PsrIndex::Parental as usize, 0xFF),
    (PsrIndex::SecondaryAudioVideo as usize, 0xFFFF),
    (PsrIndex::AudioCap as usize, 0xFFFF),
    (PsrIndex::AudioLang as usize, 0xFF_FFFF),
    (PsrIndex::PgAndSubLang as usize, 0xFF_FFFF),
    (PsrIndex::MenuLang as usize, 0xFF_FFFF),
    (PsrIndex::Country as usize, 0xFFFF),
    (PsrIndex::Region as usize, 0x02), // region B
    (PsrIndex::VideoCap as usize, 0x03),
    (PsrIndex::TextCap as usize, 0x0542),
    (PsrIndex::ProfileVersion as usize, 0x0001_0200), // profile 1, version 2.0
];

fn psr_policy(idx: usize) -> PsrPolicy {
    match idx {
        // Stream selection fields only; high nibbles hold display status
        2 => PsrPolicy::Masked(0x0FFF_0FFF),
        // Secondary audio/video stream numbers
        14 => PsrPolicy::Masked(0x0000_FFFF),
        // Player settings, written via psr_setting_write only
        13 | 15..=20 | 29 | 30 | 31 => PsrPolicy::ReadOnly,
        36..=40 | 42..=44 => PsrPolicy::Backup,
        _ => PsrPolicy::Writable,
    }
}

/// Kind of a register notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PsrEventKind {
    /// A policy-checked write stored a different value
    Change,
    /// `restore_state` wrote a saved value back (sent even when equal)
    Restore,
}

/// One register notification delivered to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PsrEvent {
    /// What happened
    pub kind: PsrEventKind,
    /// Affected PSR index
    pub psr_idx: usize,
    /// Value before the operation
    pub old_val: u32,
    /// Value after the operation
    pub new_val: u32,
}

impl fmt::Display for PsrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PsrEventKind::Change => "change",
            PsrEventKind::Restore => "restore",
        };
        match PsrIndex::from_usize(self.psr_idx) {
            Some(name) => write!(
                f,
                "PSR{} ({:?}) {}: {:#010x} -> {:#010x}",
                self.psr_idx, name, kind, self.old_val, self.new_val
            ),
            None => write!(
                f,
                "PSR{} {}: {:#010x} -> {:#010x}",
                self.psr_idx, kind, self.old_val, self.new_val
            ),
        }
    }
}

/// Observer of PSR change/restore notifications.
///
/// Callbacks run on the writing thread, after the bank's lock is released;
/// they may read or write the bank freely.
pub trait PsrObserver: Send + Sync {
    /// Called once per event, in registration order
    fn psr_event(&self, ev: &PsrEvent);
}

struct BankState {
    psr: [u32; PSR_COUNT],
    gpr: Box<[u32]>,
    observers: Vec<Arc<dyn PsrObserver>>,
}

/// The player's PSR/GPR register bank.
///
/// One instance per player session; shared across threads behind an `Arc`.
/// All methods take `&self` and serialize internally.
pub struct RegisterBank {
    state: Mutex<BankState>,
}

impl RegisterBank {
    /// Create a bank with all registers zero except the mandated defaults.
    pub fn new() -> Self {
        let mut psr = [0u32; PSR_COUNT];
        for &(idx, val) in &PSR_DEFAULTS {
            psr[idx] = val;
        }
        RegisterBank {
            state: Mutex::new(BankState {
                psr,
                gpr: vec![0u32; GPR_COUNT].into_boxed_slice(),
                observers: Vec::new(),
            }),
        }
    }

    /// Write a PSR bypassing its policy, for player configuration.
    ///
    /// Never notifies observers. Range-checked only.
    pub fn psr_setting_write(&self, idx: usize, val: u32) -> Result<()> {
        let mut state = self.state.lock();
        let slot = state
            .psr
            .get_mut(idx)
            .ok_or(BdNavError::InvalidRegister(idx))?;
        *slot = val;
        Ok(())
    }

    /// Policy-checked PSR write from a navigation program.
    ///
    /// Read-only registers and backup slots are rejected without any state
    /// change; masked registers keep their non-settable bits. Observers are
    /// notified once, after the internal lock is released, and only when the
    /// stored value actually differs from the previous one.
    pub fn psr_write(&self, idx: usize, val: u32) -> Result<()> {
        let (event, observers) = {
            let mut state = self.state.lock();
            if idx >= PSR_COUNT {
                return Err(BdNavError::InvalidRegister(idx));
            }
            let old = state.psr[idx];
            let stored = match psr_policy(idx) {
                PsrPolicy::ReadOnly | PsrPolicy::Backup => {
                    debug!("psr_write PSR{} rejected: read-only", idx);
                    return Err(BdNavError::ReadOnlyRegister(idx));
                }
                PsrPolicy::Masked(mask) => (old & !mask) | (val & mask),
                PsrPolicy::Writable => val,
            };
            if stored == old {
                return Ok(());
            }
            state.psr[idx] = stored;
            let event = PsrEvent {
                kind: PsrEventKind::Change,
                psr_idx: idx,
                old_val: old,
                new_val: stored,
            };
            (event, state.observers.clone())
        };

        for obs in &observers {
            obs.psr_event(&event);
        }
        Ok(())
    }

    /// Read a PSR value.
    pub fn psr_read(&self, idx: usize) -> Result<u32> {
        let state = self.state.lock();
        state
            .psr
            .get(idx)
            .copied()
            .ok_or(BdNavError::InvalidRegister(idx))
    }

    /// Write a general purpose register. Never notifies observers.
    pub fn gpr_write(&self, idx: usize, val: u32) -> Result<()> {
        let mut state = self.state.lock();
        let slot = state
            .gpr
            .get_mut(idx)
            .ok_or(BdNavError::InvalidRegister(idx))?;
        *slot = val;
        Ok(())
    }

    /// Read a general purpose register.
    pub fn gpr_read(&self, idx: usize) -> Result<u32> {
        let state = self.state.lock();
        state
            .gpr
            .get(idx)
            .copied()
            .ok_or(BdNavError::InvalidRegister(idx))
    }

    /// Snapshot the resume register set into the backup slots. Silent.
    pub fn save_state(&self) {
        let mut state = self.state.lock();
        for &(backup, primary) in &BACKUP_PAIRS {
            state.psr[backup] = state.psr[primary];
        }
    }

    /// Write every backup slot back to its primary register.
    ///
    /// Each pair produces one `Restore` event, whether or not the value
    /// changed: restoration is an externally visible act in its own right.
    /// Events are delivered after the lock is released, pair by pair, each
    /// to all observers in registration order.
    pub fn restore_state(&self) {
        let (events, observers) = {
            let mut state = self.state.lock();
            let mut events = Vec::with_capacity(BACKUP_PAIRS.len());
            for &(backup, primary) in &BACKUP_PAIRS {
                let old = state.psr[primary];
                let new = state.psr[backup];
                state.psr[primary] = new;
                events.push(PsrEvent {
                    kind: PsrEventKind::Restore,
                    psr_idx: primary,
                    old_val: old,
                    new_val: new,
                });
            }
            (events, state.observers.clone())
        };

        for ev in &events {
            for obs in &observers {
                obs.psr_event(ev);
            }
        }
    }

    /// Register an observer for change/restore events.
    ///
    /// Identity is the `Arc` allocation; registering the same observer twice
    /// means two deliveries per event.
    pub fn register_cb(&self, observer: Arc<dyn PsrObserver>) {
        self.state.lock().observers.push(observer);
    }

    /// Remove every registration of exactly this observer.
    ///
    /// No-op if the observer was never registered.
    pub fn unregister_cb(&self, observer: &Arc<dyn PsrObserver>) {
        self.state
            .lock()
            .observers
            .retain(|o| !Arc::ptr_eq(o, observer));
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}
