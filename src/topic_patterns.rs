//! # Topic Patterns Module
//!
//! Keyword lists and regex patterns used by the topic relevance filter.
//! Substring lists are matched against the lowercased message.

use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

/// Politics, finance and entertainment terms. A match rejects the message.
pub const BLACKLIST: &[&str] = &[
    // politics
    "политик", "выборы", "выборах", "президент", "депутат", "парламент", "война", "войне",
    "politic", "election", "president", "parliament",
    // finance
    "биткоин", "криптовалют", "курс доллара", "курс валют", "инвестиц", "биржа", "биржевые",
    "bitcoin", "crypto", "stock market", "forex", "exchange rate", "invest",
    // entertainment
    "сериал", "фильм", "кинотеатр", "знаменитост", "видеоигр", "казино", "анекдот",
    "movie", "tv show", "netflix", "celebrity", "video game", "casino",
];

/// Greetings and generic fitness nouns. A match accepts the message.
pub const WHITELIST: &[&str] = &[
    "привет", "здравствуй", "добрый день", "добрый вечер", "доброе утро", "спасибо",
    "hello", "good morning", "good evening", "thanks", "thank you",
    "фитнес", "тренировк", "питание", "похудение", "спорт",
    "fitness", "workout", "nutrition",
];

/// Cues that the user describes a health restriction
pub const HEALTH_RESTRICTION_PATTERN: &str = r"(?i)(\bcan[’']?t\b|\bcannot\b|\bcan not\b|\bhurts?\b|\bdue to\b|\binjur\w*|\bpain(?:ful|s)?\b|не могу|нельзя|\bбол(?:ит|ят|ь|и|ью|ей|ях)\b|из-за|\bтравм\w*|противопоказ|аллерги|диабет|(?:артериальн|высок|низк|повышенн|пониженн)\w*\s+давлени[еяю]|гипертони)";

/// Training, nutrition and food vocabulary, including unhealthy food
pub const DOMAIN_PATTERNS: &[&str] = &[
    // training
    r"\bwork ?outs?\b",
    r"\btrain(?:ing|er|s)?\b",
    r"\bexercis\w*",
    r"\bgym\b",
    r"\bcardio\b",
    r"\bsquats?\b",
    r"\bpush-?ups?\b",
    r"\bpull-?ups?\b",
    r"\brunning\b",
    r"\bmuscles?\b",
    r"\bstretch\w*",
    r"тренир",
    r"упражнен",
    r"спортзал",
    r"кардио",
    r"присед",
    r"отжиман",
    r"подтягиван",
    r"\bбег(?:а|ом|ать)?\b",
    r"мышц",
    r"растяжк",
    // body and nutrition
    r"\bweight\b",
    r"\bfat\b",
    r"\bcalori\w*",
    r"\bprotein\w*",
    r"\bcarb\w*",
    r"\bdiet\w*",
    r"\bmeals?\b",
    r"\bbreakfast\b",
    r"\blunch\b",
    r"\bdinner\b",
    r"\bsnacks?\b",
    r"\bvitamins?\b",
    r"\bkbju\b",
    r"\bbmi\b",
    r"похуд",
    r"\bвес[аеу]?\b",
    r"\bжир(?:ы|ов|а|у|ом|е|н\w*)?\b",
    r"\bжиросжиг\w*",
    r"калори",
    r"бел(?:ок|ка|ке|ков)",
    r"углевод",
    r"диет",
    r"питани",
    r"кбжу",
    r"завтрак",
    r"\bобед",
    r"ужин",
    r"перекус",
    r"витамин",
    // food
    r"\bfood\b",
    r"\beat(?:s|ing)?\b",
    r"\bchicken\b",
    r"\brice\b",
    r"\boat\w*",
    r"\beggs?\b",
    r"\bfruits?\b",
    r"\bvegetables?\b",
    r"\bsugar\b",
    r"\bеда\b",
    r"\bеды\b",
    r"продукт",
    r"курин",
    r"гречк",
    r"овсян",
    r"яйц",
    r"фрукт",
    r"овощ",
    r"сахар",
    // unhealthy food
    r"\bfast ?food\b",
    r"\bburgers?\b",
    r"\bpizza\b",
    r"\bchips\b",
    r"\bsoda\b",
    r"\bcandy\b",
    r"\bdonuts?\b",
    r"\bfries\b",
    r"\bsweets\b",
    r"\balcohol\w*",
    r"\bbeer\b",
    r"фастфуд",
    r"бургер",
    r"пицц",
    r"чипс",
    r"газировк",
    r"сладост",
    r"сладк",
    r"конфет",
    r"шоколад",
    r"\bторт",
    r"пирожн",
    r"алкогол",
    r"\bпив[оа]\b",
    r"майонез",
];

/// Tokens that mark an affirmative classifier reply
pub const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "да"];

lazy_static! {
    pub static ref HEALTH_RESTRICTION_REGEX: Regex = Regex::new(HEALTH_RESTRICTION_PATTERN)
        .expect("Health restriction pattern should be valid");
    pub static ref DOMAIN_REGEX_SET: RegexSet = RegexSet::new(
        DOMAIN_PATTERNS.iter().map(|pattern| format!("(?i){pattern}"))
    )
    .expect("Domain keyword patterns should be valid");
}
