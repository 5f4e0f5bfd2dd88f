use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::auth::{AuthError, exchange_code};
use crate::config::CatalogSettings;
use crate::library::{SelectionList, Track};

use super::client::{Catalog, CatalogError, PlaylistRef, SpotifyClient, export_selection};

#[derive(Debug)]
pub enum CatalogCmd {
    /// Free-text track search. `seq` comes back with the results.
    Search { seq: u64, query: String },
    /// The user's top tracks, shown while the query is empty.
    TopTracks { seq: u64 },
    Export { selection: SelectionList },
    ExchangeCode { code: String, verifier: String },
    SetToken(Option<String>),
    Quit,
}

#[derive(Debug)]
pub enum CatalogEvent {
    Results { seq: u64, tracks: Vec<Track> },
    SearchFailed { seq: u64, message: String },
    PlaylistCreated(PlaylistRef),
    ExportFailed(String),
    Authorized { access_token: String },
    AuthFailed(String),
    /// The service rejected the credential; the user has to sign in again.
    StaleCredential,
}

/// Builds catalog clients and redeems authorization codes.
pub trait Connector: Send + 'static {
    fn connect(&self, access_token: &str) -> Box<dyn Catalog>;
    fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError>;
}

/// The real web service over blocking HTTP.
pub struct HttpConnector {
    http: reqwest::blocking::Client,
    settings: CatalogSettings,
}

impl HttpConnector {
    pub fn new(settings: CatalogSettings) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            settings,
        }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, access_token: &str) -> Box<dyn Catalog> {
        Box::new(SpotifyClient::new(
            self.http.clone(),
            &self.settings,
            access_token.to_string(),
        ))
    }

    fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError> {
        exchange_code(&self.http, &self.settings, code, verifier)
    }
}

/// Runs catalog calls on a background thread so the UI never blocks on HTTP.
pub struct CatalogWorker {
    tx: Sender<CatalogCmd>,
    events: Receiver<CatalogEvent>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogWorker {
    pub fn spawn(connector: impl Connector, access_token: Option<String>) -> Self {
        let (tx, rx) = mpsc::channel::<CatalogCmd>();
        let (event_tx, events) = mpsc::channel::<CatalogEvent>();

        let handle = thread::spawn(move || run(connector, access_token, rx, event_tx));

        Self {
            tx,
            events,
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn send(&self, cmd: CatalogCmd) -> Result<(), mpsc::SendError<CatalogCmd>> {
        self.tx.send(cmd)
    }

    /// Next finished call, if any.
    pub fn try_recv(&self) -> Option<CatalogEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Ask the thread to stop and wait for the call in flight to finish.
    pub fn shutdown(&self) {
        let _ = self.send(CatalogCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

fn run(
    connector: impl Connector,
    access_token: Option<String>,
    rx: Receiver<CatalogCmd>,
    events: Sender<CatalogEvent>,
) {
    let mut catalog = access_token.as_deref().map(|t| connector.connect(t));

    // recv fails once the app side is gone
    while let Ok(cmd) = rx.recv() {
        let event = match cmd {
            CatalogCmd::Quit => break,
            CatalogCmd::SetToken(token) => {
                catalog = token.as_deref().map(|t| connector.connect(t));
                continue;
            }
            CatalogCmd::Search { seq, query } => {
                debug!(seq, "search {query:?}");
                lookup(catalog.as_deref(), seq, |c| c.search(&query))
            }
            CatalogCmd::TopTracks { seq } => {
                debug!(seq, "top tracks");
                lookup(catalog.as_deref(), seq, |c| c.top_tracks())
            }
            CatalogCmd::Export { selection } => {
                match catalog
                    .as_deref()
                    .ok_or(CatalogError::NoCredential)
                    .and_then(|c| export_selection(c, &selection))
                {
                    Ok(playlist) => CatalogEvent::PlaylistCreated(playlist),
                    Err(e) if e.is_stale_credential() => CatalogEvent::StaleCredential,
                    Err(e) => {
                        warn!("export failed: {e}");
                        CatalogEvent::ExportFailed(e.to_string())
                    }
                }
            }
            CatalogCmd::ExchangeCode { code, verifier } => {
                match connector.exchange_code(&code, &verifier) {
                    Ok(access_token) => {
                        catalog = Some(connector.connect(&access_token));
                        CatalogEvent::Authorized { access_token }
                    }
                    Err(e) => {
                        warn!("token exchange failed: {e}");
                        CatalogEvent::AuthFailed(e.to_string())
                    }
                }
            }
        };

        if events.send(event).is_err() {
            break;
        }
    }
}

fn lookup(
    catalog: Option<&dyn Catalog>,
    seq: u64,
    call: impl FnOnce(&dyn Catalog) -> Result<Vec<Track>, CatalogError>,
) -> CatalogEvent {
    match catalog.ok_or(CatalogError::NoCredential).and_then(call) {
        Ok(tracks) => CatalogEvent::Results { seq, tracks },
        Err(e) if e.is_stale_credential() => CatalogEvent::StaleCredential,
        Err(e) => {
            warn!(seq, "catalog lookup failed: {e}");
            CatalogEvent::SearchFailed {
                seq,
                message: e.to_string(),
            }
        }
    }
}
