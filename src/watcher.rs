use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

use crate::stations::{find_station_by_address, PoliceStation};

pub const DISTRICT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Currently selected receiving station, shared between the watcher and the
/// consuming form. Manual selection goes through the same setter the watcher
/// uses, so an auto-match always overwrites it.
#[derive(Clone, Default)]
pub struct SelectedStation {
    inner: Arc<Mutex<Option<&'static PoliceStation>>>,
}

impl SelectedStation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&'static PoliceStation> {
        *self.inner.lock()
    }

    pub fn set(&self, station: Option<&'static PoliceStation>) {
        *self.inner.lock() = station;
    }
}

pub type EvaluationObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Coalesces address edits: each edit cancels the pending evaluation and
/// schedules a new one after the quiet period. At most one evaluation is
/// pending at any time. Must be driven from within a tokio runtime.
pub struct DebouncedAddressWatcher {
    delay: Duration,
    selected: SelectedStation,
    pending: Mutex<Option<JoinHandle<()>>>,
    observer: Option<EvaluationObserver>,
}

impl DebouncedAddressWatcher {
    pub fn new(selected: SelectedStation) -> Self {
        Self {
            delay: DISTRICT_SEARCH_DEBOUNCE,
            selected,
            pending: Mutex::new(None),
            observer: None,
        }
    }

    /// Registers a hook invoked with the text of every evaluation that
    /// actually fires.
    pub fn with_observer(mut self, observer: EvaluationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn note_edit(&self, text: impl Into<String>) {
        let text = text.into();
        let selected = self.selected.clone();
        let observer = self.observer.clone();
        let delay = self.delay;

        let mut pending = self.pending.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            if let Some(callback) = &observer {
                callback(&text);
            }
            if let Some(station) = find_station_by_address(&text) {
                trace!(district = ?station.district, "address matched; selecting station");
                selected.set(Some(station));
            }
        }));
    }

    /// Cancels the pending evaluation, if any. Called on consumer teardown
    /// and when a location-fix flow begins, so a stale auto-match cannot
    /// fire after a GPS-derived address has been applied.
    pub fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedAddressWatcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// True only when the address resolves to a district, a station is selected,
/// and the two disagree. An unmatched address is never a conflict.
pub fn district_mismatch(address: &str, selected: Option<&PoliceStation>) -> bool {
    let Some(matched) = find_station_by_address(address) else {
        return false;
    };
    let Some(selected) = selected else {
        return false;
    };
    matched.district != selected.district
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::stations::{District, POLICE_STATIONS};

    use super::*;

    struct Recorder {
        evaluations: AtomicUsize,
        last_text: Mutex<String>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                evaluations: AtomicUsize::new(0),
                last_text: Mutex::new(String::new()),
            })
        }

        fn observer(recorder: &Arc<Self>) -> EvaluationObserver {
            let recorder = Arc::clone(recorder);
            Arc::new(move |text| {
                recorder.evaluations.fetch_add(1, Ordering::SeqCst);
                *recorder.last_text.lock() = text.to_string();
            })
        }

        fn count(&self) -> usize {
            self.evaluations.load(Ordering::SeqCst)
        }
    }

    fn station(district: District) -> &'static PoliceStation {
        POLICE_STATIONS
            .iter()
            .find(|s| s.district == district)
            .unwrap()
    }

    #[tokio::test]
    async fn rapid_edits_collapse_into_one_evaluation() {
        let recorder = Recorder::new();
        let selected = SelectedStation::new();
        let watcher = DebouncedAddressWatcher::new(selected.clone())
            .with_observer(Recorder::observer(&recorder));

        watcher.note_edit("臺");
        watcher.note_edit("臺北");
        watcher.note_edit("臺北市");
        watcher.note_edit("高雄");
        watcher.note_edit("高雄市前鎮區中山二路");

        sleep(Duration::from_millis(500)).await;

        assert_eq!(recorder.count(), 1);
        assert_eq!(&*recorder.last_text.lock(), "高雄市前鎮區中山二路");
        assert_eq!(selected.get().unwrap().district, District::Kaohsiung);
    }

    #[tokio::test]
    async fn auto_match_overwrites_manual_selection() {
        let selected = SelectedStation::new();
        selected.set(Some(station(District::Taipei)));

        let watcher = DebouncedAddressWatcher::new(selected.clone());
        watcher.note_edit("臺南市東區某街1號");
        sleep(Duration::from_millis(500)).await;

        assert_eq!(selected.get().unwrap().district, District::Tainan);
    }

    #[tokio::test]
    async fn unmatched_address_keeps_previous_selection() {
        let recorder = Recorder::new();
        let selected = SelectedStation::new();
        selected.set(Some(station(District::Yilan)));

        let watcher = DebouncedAddressWatcher::new(selected.clone())
            .with_observer(Recorder::observer(&recorder));
        watcher.note_edit("某個不存在的地方");
        sleep(Duration::from_millis(500)).await;

        assert_eq!(recorder.count(), 1);
        assert_eq!(selected.get().unwrap().district, District::Yilan);
    }

    #[tokio::test]
    async fn cancel_pending_suppresses_the_evaluation() {
        let recorder = Recorder::new();
        let watcher = DebouncedAddressWatcher::new(SelectedStation::new())
            .with_observer(Recorder::observer(&recorder));

        watcher.note_edit("臺北市信義區");
        watcher.cancel_pending();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_watcher_cancels_the_pending_evaluation() {
        let recorder = Recorder::new();
        let selected = SelectedStation::new();
        {
            let watcher = DebouncedAddressWatcher::new(selected.clone())
                .with_observer(Recorder::observer(&recorder));
            watcher.note_edit("臺北市信義區");
        }
        sleep(Duration::from_millis(500)).await;

        assert_eq!(recorder.count(), 0);
        assert!(selected.get().is_none());
    }

    #[test]
    fn mismatch_requires_a_match_and_a_selection() {
        let taipei = station(District::Taipei);
        let kaohsiung = station(District::Kaohsiung);

        assert!(district_mismatch("高雄市前鎮區", Some(taipei)));
        assert!(!district_mismatch("臺北市信義區", Some(taipei)));
        assert!(!district_mismatch("某個不存在的地方", Some(taipei)));
        assert!(!district_mismatch("高雄市前鎮區", None));
        assert!(!district_mismatch("", Some(kaohsiung)));
    }
}
