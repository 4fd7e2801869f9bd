// Many callers sharing one manager must cause a single issuer round trip
// per mint/refresh, with everybody receiving the same token.

#[cfg(test)]
mod test {

use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use tokio::task::JoinSet;

use crate::iam::manager::{ManagerConfig, TokenManager};
use crate::tests::common::{build_manager, token_body, EXP1, TOKEN_PATH};

const CALLERS: usize = 16;

async fn get_concurrently(manager: &Arc<TokenManager>) -> Vec<String> {
    let mut set = JoinSet::new();
    for _ in 0..CALLERS {
        let manager = manager.clone();
        set.spawn(async move { manager.get_token().await });
    }
    let mut tokens = Vec::with_capacity(CALLERS);
    while let Some(joined) = set.join_next().await {
        tokens.push(joined.expect("task panicked").expect("token"));
    }
    tokens
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_mint_and_one_refresh() {
    let server = MockServer::start_async().await;
    let mint = server.mock_async(|when, then| {
        when.method(POST).path(TOKEN_PATH).body_includes("apikey=key1");
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(token_body("tok1", "ref1", 3600, EXP1));
    }).await;
    let refresh = server.mock_async(|when, then| {
        when.method(POST).path(TOKEN_PATH).body_includes("refresh_token=ref1");
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(token_body("tok2", "ref2", 3600, EXP1 + 3500));
    }).await;

    let (manager, clock) = build_manager(&server, ManagerConfig::with_api_key("key1"));
    let manager = Arc::new(manager);

    let tokens = get_concurrently(&manager).await;
    assert_eq!(tokens.len(), CALLERS);
    assert!(tokens.iter().all(|t| t == "tok1"));
    mint.assert_hits_async(1).await;

    clock.set(EXP1 - 100);
    let tokens = get_concurrently(&manager).await;
    assert!(tokens.iter().all(|t| t == "tok2"));
    refresh.assert_hits_async(1).await;
    mint.assert_hits_async(1).await;
}

}
