use khobor_scrapers::IngestManager;

pub struct AppState {
    pub manager: IngestManager,
}
