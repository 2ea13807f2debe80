use goose::prelude::*;
use std::env;

fn credentials() -> (String, String) {
    let username = env::var("LOADTEST_USERNAME").unwrap_or_else(|_| "johndoe".to_string());
    let password = env::var("LOADTEST_PASSWORD").unwrap_or_else(|_| "foobar42".to_string());
    (username, password)
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

async fn login(user: &mut GooseUser) -> TransactionResult {
    let (username, password) = credentials();
    let form = [
        ("grant_type", "password"),
        ("username", username.as_str()),
        ("password", password.as_str()),
    ];
    let mut goose = user.post_form("/login", &form).await?;

    let response = match goose.response {
        Ok(response) => response,
        Err(e) => {
            return user.set_failure(
                "login request failed",
                &mut goose.request,
                None,
                Some(&e.to_string()),
            );
        }
    };
    let body: serde_json::Value = match response
        .text()
        .await
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(body) => body,
        Err(e) => {
            return user.set_failure(
                "login returned no JSON",
                &mut goose.request,
                None,
                Some(&e),
            );
        }
    };
    match body.get("access_token").and_then(|t| t.as_str()) {
        Some(token) => {
            user.set_session_data(token.to_string());
            Ok(())
        }
        None => user.set_failure(
            "login rejected",
            &mut goose.request,
            None,
            Some(&body.to_string()),
        ),
    }
}

async fn protected_page(user: &mut GooseUser) -> TransactionResult {
    let token = match user.get_session_data::<String>() {
        Some(token) => token.clone(),
        None => return Ok(()),
    };
    let _goose_metrics = user.get(&format!("/?access_token={token}")).await?;
    Ok(())
}

async fn logout(user: &mut GooseUser) -> TransactionResult {
    let token = match user.get_session_data::<String>() {
        Some(token) => token.clone(),
        None => return Ok(()),
    };
    let _goose_metrics = user.get(&format!("/logout?access_token={token}")).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    let (username, _) = credentials();
    println!("Logging in as '{username}'");

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(
            scenario!("SessionLifecycle")
                .register_transaction(transaction!(login).set_on_start())
                .register_transaction(transaction!(protected_page))
                .register_transaction(transaction!(logout).set_on_stop()),
        )
        .execute()
        .await?;

    Ok(())
}
