//! Conversation state threaded through the orchestration graph.
//!
//! Nodes never mutate a [`ConversationState`] directly. They return a
//! [`StateUpdate`] holding only the fields they touched, and the graph engine
//! folds it in through [`ConversationState::merge`], which applies one reducer
//! per field:
//!
//! | field                   | reducer            |
//! |-------------------------|--------------------|
//! | `messages`              | [`append_messages`] |
//! | `active_search_filters` | [`replace_field`]   |
//! | `cart`                  | [`replace_field`]   |
//!
//! A field left empty in the update leaves the state untouched.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    pub fn is_price_ordering(&self) -> bool {
        !matches!(self, Self::Relevance)
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relevance" | "" => Ok(Self::Relevance),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            other => Err(format!(
                "unsupported sort order `{other}` (expected relevance|price_asc|price_desc)"
            )),
        }
    }
}

/// Structured constraints extracted by the router.
///
/// Every field is defaulted so a partially populated backend response still
/// decodes: an empty query, no price ceiling, relevance ordering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    /// `0` (or absent) means unbounded, not "free items only".
    #[serde(default, alias = "max_price_inr", deserialize_with = "null_as_default")]
    pub max_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sort_by: SortBy,
}

impl SearchFilters {
    pub fn new(query: impl Into<String>, max_price: f64, sort_by: SortBy) -> Self {
        Self { query: query.into(), max_price, sort_by }
    }

    /// The inclusive price ceiling, if one applies.
    pub fn price_ceiling(&self) -> Option<f64> {
        (self.max_price > 0.0).then_some(self.max_price)
    }
}

/// Deserializes `null` as the type's default instead of failing.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    /// `None` is the empty mapping. Callers may send `{}` for it.
    #[serde(default, deserialize_with = "empty_map_as_none")]
    pub active_search_filters: Option<SearchFilters>,
}

impl ConversationState {
    /// A fresh per-invocation state: the caller's history, no filters, empty cart.
    pub fn from_history(messages: Vec<Message>) -> Self {
        Self { messages, cart: Vec::new(), active_search_filters: None }
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_search_filters.is_some()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn merge(&mut self, update: StateUpdate) {
        append_messages(&mut self.messages, update.messages);
        replace_field(&mut self.active_search_filters, update.active_search_filters.map(Some));
        replace_field(&mut self.cart, update.cart);
    }
}

/// Partial state returned by a graph node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub active_search_filters: Option<SearchFilters>,
    pub cart: Option<Vec<CartItem>>,
}

impl StateUpdate {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_message(message: Message) -> Self {
        Self { messages: vec![message], ..Self::default() }
    }

    pub fn with_filters(filters: SearchFilters) -> Self {
        Self { active_search_filters: Some(filters), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.active_search_filters.is_none() && self.cart.is_none()
    }
}

/// Append-only reducer: new entries go after the existing ones, in order.
pub fn append_messages(current: &mut Vec<Message>, update: Vec<Message>) {
    current.extend(update);
}

/// Wholesale replacement reducer. `None` means "no update for this field".
pub fn replace_field<T>(current: &mut T, update: Option<T>) {
    if let Some(value) = update {
        *current = value;
    }
}

fn empty_map_as_none<'de, D>(deserializer: D) -> Result<Option<SearchFilters>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct FiltersWire {
        query: Option<String>,
        #[serde(alias = "max_price_inr")]
        max_price: Option<f64>,
        sort_by: Option<SortBy>,
    }

    let Some(wire) = Option::<FiltersWire>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if wire.query.is_none() && wire.max_price.is_none() && wire.sort_by.is_none() {
        return Ok(None);
    }

    Ok(Some(SearchFilters {
        query: wire.query.unwrap_or_default(),
        max_price: wire.max_price.unwrap_or_default(),
        sort_by: wire.sort_by.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::{
        append_messages, replace_field, ConversationState, Message, Role, SearchFilters, SortBy,
        StateUpdate,
    };

    fn history() -> Vec<Message> {
        vec![Message::user("hi"), Message::assistant("hello!"), Message::user("find a jacket")]
    }

    #[test]
    fn append_keeps_existing_prefix_and_order() {
        let mut messages = history();
        append_messages(
            &mut messages,
            vec![Message::assistant("first"), Message::assistant("second")],
        );

        assert_eq!(messages.len(), 5);
        assert_eq!(&messages[..3], history().as_slice());
        assert_eq!(messages[3].content, "first");
        assert_eq!(messages[4].content, "second");
    }

    #[test]
    fn replace_without_update_leaves_value_untouched() {
        let mut value = Some(SearchFilters::new("jacket", 100.0, SortBy::Relevance));
        replace_field(&mut value, None);
        assert_eq!(value, Some(SearchFilters::new("jacket", 100.0, SortBy::Relevance)));

        replace_field(&mut value, Some(None));
        assert_eq!(value, None);
    }

    #[test]
    fn merge_replaces_filters_wholesale() {
        let mut state = ConversationState::from_history(history());
        state.active_search_filters = Some(SearchFilters::new("shoes", 500.0, SortBy::PriceDesc));

        state.merge(StateUpdate::with_filters(SearchFilters {
            query: "jacket".to_string(),
            ..SearchFilters::default()
        }));

        let filters = state.active_search_filters.expect("filters should be set");
        assert_eq!(filters.query, "jacket");
        assert_eq!(filters.max_price, 0.0);
        assert_eq!(filters.sort_by, SortBy::Relevance);
        assert_eq!(state.messages, history());
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut state = ConversationState::from_history(history());
        let before = state.clone();
        state.merge(StateUpdate::empty());
        assert_eq!(state, before);
    }

    #[test]
    fn state_accepts_empty_filter_mapping() {
        let state: ConversationState = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"Hello there!"}],"cart":[],"active_search_filters":{}}"#,
        )
        .expect("state should decode");

        assert_eq!(state.messages[0].role, Role::User);
        assert!(state.active_search_filters.is_none());
        assert!(state.cart.is_empty());
    }

    #[test]
    fn state_decodes_partial_filter_mapping_with_defaults() {
        let state: ConversationState = serde_json::from_str(
            r#"{"messages":[],"active_search_filters":{"max_price_inr":100}}"#,
        )
        .expect("state should decode");

        let filters = state.active_search_filters.expect("filters should be present");
        assert_eq!(filters.query, "");
        assert_eq!(filters.max_price, 100.0);
        assert_eq!(filters.sort_by, SortBy::Relevance);
    }

    #[test]
    fn zero_max_price_has_no_ceiling() {
        assert_eq!(SearchFilters::new("hat", 0.0, SortBy::Relevance).price_ceiling(), None);
        assert_eq!(SearchFilters::new("hat", 250.0, SortBy::Relevance).price_ceiling(), Some(250.0));
    }

    #[test]
    fn sort_by_parses_known_values() {
        assert_eq!("price_asc".parse::<SortBy>(), Ok(SortBy::PriceAsc));
        assert_eq!(" PRICE_DESC ".parse::<SortBy>(), Ok(SortBy::PriceDesc));
        assert!("newest".parse::<SortBy>().is_err());
    }
}
