use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use aed_data::{
    geo_join::GeoFeature,
    load::{LoadError, LoadState},
};

use crate::geometry::{self, MapShape};

type Features = Vec<GeoFeature<MapShape>>;

/// Loads the GeoJSON file on a worker thread.
///
/// The result is picked up by [`poll`](Self::poll) from the UI thread, so the
/// dashboard stays usable while large files parse.
#[derive(Debug)]
pub(super) struct GeometryLoader {
    origin: String,
    receiver: Option<Receiver<Result<Features, String>>>,
}

impl GeometryLoader {
    pub(super) fn spawn(path: Option<PathBuf>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let origin = match path {
            Some(path) => {
                let origin = path.display().to_string();
                thread::spawn(move || {
                    let result = geometry::read_features(&path).map_err(|e| format!("{e:#}"));
                    // the receiver is gone only if the dashboard already exited
                    let _ = sender.send(result);
                });
                origin
            }
            None => {
                let _ = sender.send(Err("no --geometry file was given".to_owned()));
                "geometry".to_owned()
            }
        };
        Self {
            origin,
            receiver: Some(receiver),
        }
    }

    /// Returns the load result once, as soon as it is available.
    pub(super) fn poll(&mut self) -> Option<LoadState<Features>> {
        let receiver = self.receiver.as_ref()?;
        let state = match receiver.try_recv() {
            Ok(result) => LoadState::from_result(self.origin.clone(), result),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                LoadState::Failed(LoadError::new(self.origin.clone(), "loader thread panicked"))
            }
        };
        self.receiver = None;
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_missing_path_fails_immediately() {
        let mut loader = GeometryLoader::spawn(None);
        let state = loader.poll().unwrap();
        assert!(state.is_failed());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_unreadable_file_fails() {
        let mut loader = GeometryLoader::spawn(Some(PathBuf::from("/nonexistent/us.geojson")));
        let state = loop {
            if let Some(state) = loader.poll() {
                break state;
            }
            thread::sleep(Duration::from_millis(5));
        };
        let error = state.error().unwrap();
        assert_eq!(error.origin, "/nonexistent/us.geojson");
        assert!(error.message.contains("Failed to read GeoJSON file"));
    }
}
