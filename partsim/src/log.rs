//! The simulation's own narration: an append-only, switchable record
//! of what happened, and the plain-text export built from it.
//!
//! Not to be confused with diagnostics, which go through `tracing`.

use crate::helpe::*;

/// `toUTCString`-style rendering, e.g. `Tue, 15 Nov 1994 08:12:31 GMT`.
const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id:         u32,
    pub timestamp:  DateTime<Utc>,
    pub text:       String,
}

impl LogEntry {
    /// The entry as an export line (without the newline).
    pub fn render(&self) -> String {
        format!("{} - {}", self.timestamp.format(TIMESTAMP_FORMAT), self.text)
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    entries:    Vec<LogEntry>,
    enabled:    bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Logging starts out enabled.
    pub fn new() -> Self {
        Self {
            entries:    vec![],
            enabled:    true,
        }
    }

    /// Appends an entry stamped with the current time. Returns its id,
    /// or `None` if logging is off (the text is dropped, not buffered).
    pub fn append(&mut self, text: impl Into<String>) -> Option<u32> {
        self.append_at(Utc::now(), text)
    }

    pub fn append_at(&mut self, timestamp: DateTime<Utc>, text: impl Into<String>) -> Option<u32> {
        if !self.enabled { return None; }
        // Ids follow the entry count, so they stay gapless even
        // across spells of disabled logging.
        let id = self.entries.len() as u32 + 1;
        self.entries.push(LogEntry {
            id,
            timestamp,
            text: text.into(),
        });

        Some(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Flips the switch and returns the new state.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The entities as they stood when the simulation started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub partitions: Vec<Partition>,
    pub programs:   Vec<Program>,
    pub pool_size:  KiloBytes,
}

impl Manifest {
    pub fn capture(store: &Store) -> Self {
        Self {
            partitions: store.partitions().cloned().collect(),
            programs:   store.programs().cloned().collect(),
            pool_size:  store.pool().total_size,
        }
    }
}

/// A ready-to-save text document.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub filename:   &'static str,
    pub contents:   String,
}

impl Export {
    /// Lays out the header, the manifest and then every log line.
    ///
    /// Static mode lists partitions; dynamic mode prints the pool size
    /// in their place.
    pub fn build(
        mode:       Mode,
        strategy:   Strategy,
        manifest:   &Manifest,
        log:        &EventLog,
    ) -> Self {
        let mut contents = format!(
            "Allocation method: {}\nStrategy: {strategy}\n\n",
            mode.method_name(),
        );
        match mode {
            Mode::Static    => {
                contents.push_str("Partitions:\n");
                for p in &manifest.partitions {
                    contents.push_str(&format!("Partition {} - {}kb\n", p.id, p.size));
                }
            },
            Mode::Dynamic   => {
                contents.push_str(&format!("Total size: {}kb\n", manifest.pool_size));
            }
        }
        contents.push_str("Programs:\n");
        for p in &manifest.programs {
            contents.push_str(&format!("Program {} - {}kb\n", p.id, p.size));
        }
        contents.push_str("Simulation Log:\n");
        for e in log.entries() {
            contents.push_str(&e.render());
            contents.push('\n');
        }

        Self {
            filename: mode.log_filename(),
            contents,
        }
    }
}
