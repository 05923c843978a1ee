//! A small user directory served over HTTP.
//!
//! ```text
//! cargo run -p doze --example users
//! curl localhost:8080/api/users/1
//! curl -X POST localhost:8080/api/users -d '{"name":"grace"}'
//! curl -X DELETE -H 'x-api-key: secret' localhost:8080/api/users/1
//! ```
//!
//! Settings come from `doze.toml` when present and from `DOZE__*` variables.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use doze::prelude::*;
use http::header::LOCATION;
use http::HeaderValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

#[derive(Debug, Default)]
struct Directory {
    users: Mutex<BTreeMap<i64, User>>,
}

impl Directory {
    fn with<T>(&self, f: impl FnOnce(&mut BTreeMap<i64, User>) -> T) -> T {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut users)
    }
}

fn require_key(ctx: &mut Context<'_>) -> bool {
    if ctx.method() != Method::DELETE || ctx.headers().get("x-api-key").is_some_and(|k| k == "secret") {
        return true;
    }
    let _ = ctx.send(&Response::text(StatusCode::UNAUTHORIZED, "missing api key"));
    false
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = ConfigLoader::new()
        .with_development()
        .with_optional_file("doze.toml")?
        .with_env_prefix("DOZE")
        .load()?;
    if config.router.prefix.is_empty() {
        config.router.prefix = "/api".to_string();
    }
    init_logging(&config.logging.log_config())?;

    let directory = Arc::new(Directory::default());
    directory.with(|users| {
        users.insert(1, User { id: 1, name: "ada".to_string() });
    });

    let list = Arc::clone(&directory);
    let show = Arc::clone(&directory);
    let create = Arc::clone(&directory);
    let remove = Arc::clone(&directory);

    let dispatcher = DispatcherBuilder::from_config(&config)
        .middleware(RequestIdMiddleware::new())
        .middleware(AccessLogMiddleware::new())
        .intercept(require_key)
        .group("/users", move |users| {
            users.get("", move |_ctx| {
                let all: Vec<User> = list.with(|u| u.values().cloned().collect());
                Ok(Some(Response::ok_json(&all)?))
            })?;
            users.named(Method::GET, "/{id:i}", "user", move |ctx| {
                let id = ctx.param_int("id").unwrap_or_default();
                match show.with(|u| u.get(&id).cloned()) {
                    Some(user) => Ok(Some(Response::ok_json(&user)?)),
                    None => Ok(Some(Response::not_found())),
                }
            })?;
            users.post("", move |ctx| {
                let new: NewUser = ctx.bind_json()?;
                let user = create.with(|u| {
                    let id = u.keys().next_back().map_or(1, |last| last + 1);
                    let user = User { id, name: new.name };
                    u.insert(id, user.clone());
                    user
                });
                let prefix = ctx.route().map_or("", |r| r.template.as_str());
                let location = HeaderValue::try_from(format!("{prefix}/{}", user.id))
                    .map_err(|e| DispatchError::handler_with_source("bad location", e))?;
                Ok(Some(Response::created_json(&user)?.with_header(LOCATION, location)))
            })?;
            users.delete("/{id:i}", move |ctx| {
                let id = ctx.param_int("id").unwrap_or_default();
                Ok(Some(match remove.with(|u| u.remove(&id)) {
                    Some(_) => Response::no_content(),
                    None => Response::not_found(),
                }))
            })?;
            Ok(())
        })
        .build()?;

    tracing::info!(
        user = %dispatcher.build_path("user", [("id", 1)])?,
        "example route"
    );

    Server::from_config(dispatcher, &config).run().await?;
    Ok(())
}
