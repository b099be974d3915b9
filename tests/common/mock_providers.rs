/*!
 * Scripted engines for the news-title scenarios
 *
 * Detection and translation answers are fixed per input text so the tests
 * never depend on a real model.
 */

use langbridge::providers::mock::{MockDetector, MockTranslator};

pub const FRENCH_TITLE: &str = "Bonjour tout le monde";
pub const SPANISH_TITLE: &str = "Hola mundo";

/// Single-column table with a header and the two titles
pub const NEWS_TABLE: &str = "News_Title\nBonjour tout le monde\nHola mundo\n";

/// Detector that knows the French and Spanish titles
pub fn news_detector() -> MockDetector {
    MockDetector::fixed("en", 0.5)
        .with_script(FRENCH_TITLE, "fr", 0.9912)
        .with_script(SPANISH_TITLE, "es", 0.97)
}

/// Translator that knows the French and Spanish titles
pub fn news_translator() -> MockTranslator {
    MockTranslator::working()
        .with_script(FRENCH_TITLE, "Hello everyone")
        .with_script(SPANISH_TITLE, "Hello world")
}
