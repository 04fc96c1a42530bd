use std::{collections::HashMap, future::Future, pin::Pin};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    services::{auth_service, item_service, order_service, seed_service},
    state::AppState,
};

/// `None` means the action produced nothing; it is answered with `{}`.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = AppResult<Option<Value>>> + Send + 'a>>;
pub type Handler = for<'a> fn(&'a AppState, Value) -> HandlerFuture<'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Init,
    Login,
    AddOrder,
    OrderList,
    CompleteOrder,
    ReopenOrder,
    ItemList,
    AddItem,
    RemoveItem,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Init,
        Action::Login,
        Action::AddOrder,
        Action::OrderList,
        Action::CompleteOrder,
        Action::ReopenOrder,
        Action::ItemList,
        Action::AddItem,
        Action::RemoveItem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Init => "INIT",
            Action::Login => "LOGIN",
            Action::AddOrder => "ADD_ORDER",
            Action::OrderList => "ORDER_LIST",
            Action::CompleteOrder => "COMPLETE_ORDER",
            Action::ReopenOrder => "REOPEN_ORDER",
            Action::ItemList => "ITEM_LIST",
            Action::AddItem => "ADD_ITEM",
            Action::RemoveItem => "REMOVE_ITEM",
        }
    }

    fn handler(self) -> Handler {
        match self {
            Action::Init => init,
            Action::Login => login,
            Action::AddOrder => add_order,
            Action::OrderList => order_list,
            Action::CompleteOrder => complete_order,
            Action::ReopenOrder => reopen_order,
            Action::ItemList => item_list,
            Action::AddItem => add_item,
            Action::RemoveItem => remove_item,
        }
    }
}

fn parse<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    serde_json::from_value(data).map_err(|e| AppError::BadRequest(format!("invalid data: {e}")))
}

/// Free-form record fields: `null` is an empty set, anything but an object is refused.
fn attributes(data: Value) -> AppResult<Map<String, Value>> {
    match data {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("data must be an object".into())),
    }
}

fn payload<T: Serialize>(value: T) -> AppResult<Option<Value>> {
    let value = serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Some(value))
}

fn init(state: &AppState, _data: Value) -> HandlerFuture<'_> {
    Box::pin(async move {
        seed_service::init(state).await?;
        Ok(None)
    })
}

fn login(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move {
        match auth_service::login_user(state, parse(data)?).await? {
            Some(resp) => payload(resp),
            None => Ok(None),
        }
    })
}

fn add_order(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move { payload(order_service::create_order(state, attributes(data)?).await?) })
}

fn order_list(state: &AppState, _data: Value) -> HandlerFuture<'_> {
    Box::pin(async move { payload(order_service::list_orders(state).await?) })
}

fn complete_order(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move { payload(order_service::complete_order(state, parse(data)?).await?) })
}

fn reopen_order(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move { payload(order_service::reopen_order(state, parse(data)?).await?) })
}

fn item_list(state: &AppState, _data: Value) -> HandlerFuture<'_> {
    Box::pin(async move { payload(item_service::list_items(state).await?) })
}

fn add_item(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move {
        item_service::add_item(state, attributes(data)?).await?;
        Ok(None)
    })
}

fn remove_item(state: &AppState, data: Value) -> HandlerFuture<'_> {
    Box::pin(async move {
        item_service::remove_item(state, parse(data)?).await?;
        Ok(None)
    })
}

/// Immutable action-name → handler table, built once at startup.
pub struct Dispatcher {
    routes: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let routes = Action::ALL
            .iter()
            .map(|action| (action.name(), action.handler()))
            .collect();
        Self { routes }
    }

    /// Exact, case-sensitive match.
    pub fn lookup(&self, name: &str) -> Option<Handler> {
        self.routes.get(name).copied()
    }

    #[cfg(test)]
    fn actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.keys().copied()
    }

    /// `Ok(None)` for an unknown action, which the caller answers with `{}`.
    pub async fn dispatch(
        &self,
        state: &AppState,
        action: &str,
        data: Value,
    ) -> AppResult<Option<Value>> {
        match self.lookup(action) {
            Some(handler) => handler(state, data).await,
            None => {
                tracing::debug!(action = %action, "unknown action");
                Ok(None)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_is_routed_once() {
        let dispatcher = Dispatcher::new();
        let mut names: Vec<&str> = dispatcher.actions().collect();
        names.sort_unstable();
        let mut expected: Vec<&str> = Action::ALL.iter().map(|a| a.name()).collect();
        expected.sort_unstable();
        assert_eq!(names, expected);
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn lookup_is_exact() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.lookup("LOGIN").is_some());
        assert!(dispatcher.lookup("login").is_none());
        assert!(dispatcher.lookup(" LOGIN").is_none());
        assert!(dispatcher.lookup("DELETE_ORDER").is_none());
    }

    #[tokio::test]
    async fn unknown_action_yields_nothing() {
        let state = AppState::in_memory(b"secret");
        let result = Dispatcher::new()
            .dispatch(&state, "DROP_TABLE", Value::Null)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
