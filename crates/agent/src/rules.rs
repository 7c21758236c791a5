//! Deterministic keyword classifier.
//!
//! Used by tests and offline demos in place of a language backend. Only the
//! most recent user message is inspected; earlier turns are ignored.

use async_trait::async_trait;
use cartwise_core::domain::conversation::{Message, Role, SearchFilters, SortBy};
use cartwise_core::domain::routing::RouterDecision;

use crate::classifier::Classifier;
use crate::errors::RoutingError;

pub const GREETING_REPLY: &str = "Hi there! I'm your shopping assistant. Tell me what you're looking for, for example a winter jacket under 2000 INR.";
pub const THANKS_REPLY: &str = "You're welcome! Let me know if you need anything else.";
pub const FALLBACK_REPLY: &str =
    "I can help you find products in our catalog. Try asking for an item and a budget.";

#[derive(Clone, Debug, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, text: &str) -> RouterDecision {
        let normalized_text = normalize_text(text);
        let tokens = tokenize(&normalized_text);

        let query_terms = extract_query_terms(&tokens);
        let has_product = tokens.iter().any(|token| is_product_noun(token));
        let has_shopping_verb = tokens.iter().any(|token| is_shopping_verb(token));
        let max_price = extract_max_price(&tokens);
        let sort_by = extract_sort(&normalized_text);

        let is_search = has_product
            || (has_shopping_verb && (!query_terms.is_empty() || max_price.is_some()));
        if !is_search {
            return RouterDecision::chat(chat_reply(&tokens));
        }

        RouterDecision::search(SearchFilters::new(
            query_terms.join(" "),
            max_price.unwrap_or(0.0),
            sort_by,
        ))
    }
}

#[async_trait]
impl Classifier for RuleBasedClassifier {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn classify(&self, history: &[Message]) -> Result<RouterDecision, RoutingError> {
        let latest = history
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
            .unwrap_or_default();
        Ok(self.decide(latest))
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

/// Splits into ASCII word tokens. The rupee sign is kept so currency-tagged
/// amounts survive; apostrophes are dropped, so "men's" becomes "mens".
/// Thousands separators are removed, so "1,500" stays one token.
fn tokenize(text: &str) -> Vec<String> {
    let characters = text.chars().collect::<Vec<_>>();
    let mut sanitized = String::with_capacity(text.len());
    for (position, &character) in characters.iter().enumerate() {
        if character == ',' && is_digit_separator(&characters, position) {
            continue;
        }
        if character.is_ascii_alphanumeric() || matches!(character, '.' | '\u{20b9}' | '-') {
            sanitized.push(character);
        } else if matches!(character, '\'' | '\u{2019}') {
            continue;
        } else {
            sanitized.push(' ');
        }
    }
    sanitized
        .split_whitespace()
        .map(|token| token.trim_matches(|c| c == '.' || c == '-').to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_digit_separator(characters: &[char], position: usize) -> bool {
    let before = position.checked_sub(1).and_then(|prev| characters.get(prev));
    let after = characters.get(position + 1);
    before.is_some_and(char::is_ascii_digit) && after.is_some_and(char::is_ascii_digit)
}

fn extract_query_terms(tokens: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in tokens {
        if !(is_product_noun(token) || is_descriptor(token)) {
            continue;
        }
        if !token.is_ascii() || terms.iter().any(|existing| existing == token) {
            continue;
        }
        terms.push(token.clone());
    }
    terms
}

fn extract_max_price(tokens: &[String]) -> Option<f64> {
    let budget_context = ["under", "below", "max", "upto", "budget", "within", "than", "to"];
    for (index, token) in tokens.iter().enumerate() {
        let previous = index.checked_sub(1).map(|prev| tokens[prev].as_str());
        let in_context = match previous {
            Some("than") => index >= 2 && tokens[index - 2] == "less",
            Some("to") => index >= 2 && tokens[index - 2] == "up",
            Some(word) => budget_context.contains(&word),
            None => false,
        };
        // "under rs 2000" and "\u{20b9} 300" put the currency word between the
        // budget word and the amount.
        let currency_tagged = token.starts_with('\u{20b9}')
            || token.starts_with("rs")
            || previous.is_some_and(is_currency_word)
            || tokens.get(index + 1).is_some_and(|next| is_currency_word(next));

        if in_context || currency_tagged {
            if let Some(amount) = parse_money_token(token) {
                return Some(amount);
            }
        }
    }
    None
}

fn parse_money_token(token: &str) -> Option<f64> {
    let trimmed = token.trim_start_matches('\u{20b9}');
    let trimmed = trimmed.strip_prefix("rs").unwrap_or(trimmed);
    let trimmed = trimmed.trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }

    let (number_part, multiplier) = if let Some(prefix) = trimmed.strip_suffix('k') {
        (prefix, 1_000.0)
    } else {
        (trimmed, 1.0)
    };

    let amount = number_part.parse::<f64>().ok()? * multiplier;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn extract_sort(normalized_text: &str) -> SortBy {
    let descending = ["most expensive", "priciest", "highest price", "premium", "luxury"];
    let ascending = ["cheapest", "lowest price", "least expensive", "most affordable"];

    if descending.iter().any(|pattern| normalized_text.contains(pattern)) {
        SortBy::PriceDesc
    } else if ascending.iter().any(|pattern| normalized_text.contains(pattern)) {
        SortBy::PriceAsc
    } else {
        SortBy::Relevance
    }
}

fn chat_reply(tokens: &[String]) -> String {
    let greeting = ["hi", "hello", "hey", "hiya", "namaste", "greetings"];
    let thanks = ["thanks", "thank", "thx"];

    if tokens.iter().any(|token| greeting.contains(&token.as_str())) {
        GREETING_REPLY.to_string()
    } else if tokens.iter().any(|token| thanks.contains(&token.as_str())) {
        THANKS_REPLY.to_string()
    } else {
        FALLBACK_REPLY.to_string()
    }
}

fn is_currency_word(token: &str) -> bool {
    matches!(token, "inr" | "rs" | "rupees" | "rupee" | "\u{20b9}")
}

fn is_shopping_verb(token: &str) -> bool {
    matches!(
        token,
        "find" | "show" | "search" | "buy" | "looking" | "want" | "need" | "get" | "recommend"
    )
}

fn is_product_noun(token: &str) -> bool {
    matches!(
        token,
        "jacket"
            | "jackets"
            | "coat"
            | "jeans"
            | "denim"
            | "shoes"
            | "shoe"
            | "sneakers"
            | "t-shirt"
            | "t-shirts"
            | "tshirt"
            | "tee"
            | "shirt"
            | "blazer"
            | "blazers"
            | "hat"
            | "hats"
            | "cap"
            | "backpack"
            | "backpacks"
            | "bag"
            | "pencil"
            | "pencils"
            | "earbuds"
            | "headphones"
            | "sunglasses"
            | "shades"
    )
}

fn is_descriptor(token: &str) -> bool {
    matches!(
        token,
        "black"
            | "white"
            | "red"
            | "blue"
            | "navy"
            | "grey"
            | "gray"
            | "green"
            | "brown"
            | "beige"
            | "yellow"
            | "mens"
            | "men"
            | "womens"
            | "women"
            | "unisex"
            | "winter"
            | "warm"
            | "running"
            | "cotton"
            | "formal"
            | "sun"
            | "travel"
            | "graphite"
            | "wireless"
            | "leather"
            | "casual"
            | "ski"
            | "set"
    )
}

#[cfg(test)]
mod tests {
    use cartwise_core::domain::conversation::{Message, SortBy};
    use cartwise_core::domain::routing::RouteAction;

    use std::sync::Arc;

    use super::{RuleBasedClassifier, GREETING_REPLY};
    use crate::classifier::Classifier;
    use crate::router::IntentRouter;

    #[test]
    fn greeting_routes_to_chat() {
        let decision = RuleBasedClassifier::new().decide("Hello there!");
        assert_eq!(decision.action, RouteAction::Chat);
        assert_eq!(decision.chat_reply, GREETING_REPLY);
    }

    #[test]
    fn budget_request_extracts_query_and_ceiling() {
        let decision = RuleBasedClassifier::new().decide("Find me a jacket under 100 INR");
        assert_eq!(decision.action, RouteAction::Search);
        assert_eq!(decision.search_params.query, "jacket");
        assert_eq!(decision.search_params.max_price, 100.0);
        assert_eq!(decision.search_params.sort_by, SortBy::Relevance);
        assert_eq!(decision.validate(), Ok(()));
    }

    #[test]
    fn apostrophes_are_stripped_from_query() {
        let decision = RuleBasedClassifier::new().decide("show me men's black winter jacket");
        assert_eq!(decision.search_params.query, "mens black winter jacket");
        assert_eq!(decision.validate(), Ok(()));
    }

    #[test]
    fn sort_phrases_select_price_ordering() {
        let classifier = RuleBasedClassifier::new();
        assert_eq!(
            classifier.decide("cheapest running shoes").search_params.sort_by,
            SortBy::PriceAsc
        );
        assert_eq!(
            classifier.decide("most expensive sunglasses you have").search_params.sort_by,
            SortBy::PriceDesc
        );
    }

    #[test]
    fn handles_common_budget_phrasings() {
        struct Case {
            text: &'static str,
            max_price: f64,
        }

        let cases = [
            Case { text: "jeans below 1500", max_price: 1500.0 },
            Case { text: "backpack less than 2k", max_price: 2000.0 },
            Case { text: "earbuds up to 5000", max_price: 5000.0 },
            Case { text: "hat for \u{20b9}300", max_price: 300.0 },
            Case { text: "blazer 4000 rupees", max_price: 4000.0 },
            Case { text: "pencil set budget 200", max_price: 200.0 },
            Case { text: "i need sunglasses", max_price: 0.0 },
            Case { text: "black jacket under 1,500", max_price: 1500.0 },
            Case { text: "earbuds under 12,000 inr", max_price: 12000.0 },
            Case { text: "jacket under rs 2000", max_price: 2000.0 },
            Case { text: "jacket under Rs. 2000", max_price: 2000.0 },
            Case { text: "hat under \u{20b9} 2000", max_price: 2000.0 },
        ];

        let classifier = RuleBasedClassifier::new();
        for case in cases {
            let decision = classifier.decide(case.text);
            assert_eq!(decision.action, RouteAction::Search, "case: {}", case.text);
            assert_eq!(decision.search_params.max_price, case.max_price, "case: {}", case.text);
        }
    }

    #[test]
    fn shopping_verb_with_budget_but_no_product_still_searches() {
        let decision = RuleBasedClassifier::new().decide("show me something under 500");
        assert_eq!(decision.action, RouteAction::Search);
        assert_eq!(decision.search_params.query, "");
        assert_eq!(decision.search_params.max_price, 500.0);
    }

    #[test]
    fn comma_grouped_budget_keeps_query_intact() {
        let decision = RuleBasedClassifier::new().decide("black jacket under 1,500");
        assert_eq!(decision.search_params.query, "black jacket");
        assert_eq!(decision.search_params.max_price, 1500.0);
    }

    #[test]
    fn amounts_that_overflow_after_multiplier_are_ignored() {
        let decision = RuleBasedClassifier::new().decide("hat under 1e308k");
        assert_eq!(decision.action, RouteAction::Search);
        assert_eq!(decision.search_params.max_price, 0.0);
        assert_eq!(decision.validate(), Ok(()));
    }

    #[tokio::test]
    async fn overflowing_budget_still_routes() {
        let router = IntentRouter::new(Arc::new(RuleBasedClassifier::new()));
        let decision =
            router.route(&[Message::user("hat under 1e308k")]).await.expect("routes");
        assert_eq!(decision.action, RouteAction::Search);
    }

    #[tokio::test]
    async fn only_latest_user_message_is_classified() {
        let history = vec![
            Message::user("find me a jacket"),
            Message::assistant("Here are the top matches I found:"),
            Message::user("thanks!"),
        ];

        let decision = RuleBasedClassifier::new().classify(&history).await.expect("decision");
        assert_eq!(decision.action, RouteAction::Chat);
    }
}
