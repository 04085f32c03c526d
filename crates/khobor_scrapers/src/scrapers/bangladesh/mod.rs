use crate::scrapers::ScraperType;

pub mod bd_pratidin;
pub mod daily_star;
pub mod prothom_alo;

pub use bd_pratidin::BdPratidinScraper;
pub use daily_star::DailyStarScraper;
pub use prothom_alo::ProthomAloScraper;

/// Returns one scraper per supported Bangladeshi publisher.
pub fn default_scrapers() -> Vec<ScraperType> {
    vec![
        ScraperType::BdPratidin(BdPratidinScraper::new()),
        ScraperType::ProthomAlo(ProthomAloScraper::new()),
        ScraperType::DailyStar(DailyStarScraper::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Scraper;

    #[test]
    fn each_scraper_handles_its_own_urls() {
        let scrapers = default_scrapers();
        assert_eq!(scrapers.len(), 3);

        let bd_url = "https://www.bd-pratidin.com/city/2024/01/02/123456";
        let alo_url = "https://www.prothomalo.com/bangladesh/abc123";
        let star_url = "https://www.thedailystar.net/news/bangladesh/article";

        assert!(scrapers.iter().any(|s| s.can_handle(bd_url)));
        assert!(scrapers.iter().any(|s| s.can_handle(alo_url)));
        assert!(scrapers.iter().any(|s| s.can_handle(star_url)));
        assert!(!scrapers
            .iter()
            .any(|s| s.can_handle("https://www.clarin.com/article")));
    }
}
