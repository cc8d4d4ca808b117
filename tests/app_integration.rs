use chrono::Utc;
use fxpad::core::{CurrencyCode, PersistenceStore};
use fxpad::store::DiskStore;
use fxpad::{AppCommand, run_command};
use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_server(base: &str, mock_response: &str, calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v1/currencies/{base}.json");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(calls)
            .mount(&mock_server)
            .await;

        mock_server
    }
}

// A rate for every known currency, dated today, so the snapshot is fresh.
fn complete_eur_response() -> String {
    let quotes = CurrencyCode::ALL
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let rate = if *code == CurrencyCode::Eur {
                1.0
            } else {
                1.0 + i as f64
            };
            format!(r#""{}": {}"#, code.as_str().to_lowercase(), rate)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"{{"date": "{}", "eur": {{{}}}}}"#,
        Utc::now().date_naive().format("%Y-%m-%d"),
        quotes
    )
}

fn write_config(dir: &Path, base_url: &str) -> String {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
pivot: EUR
currencies: [GEL, RUB, EUR, USD]
visible: 4
providers:
  currency_api:
    base_url: {}
data_path: {}
"#,
        base_url,
        dir.join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_str().unwrap().to_string()
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    // One fetch on the first run, one for the forced refresh at the end.
    let mock_server =
        test_utils::create_rates_server("eur", &complete_eur_response(), 2).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let commands = vec![
        AppCommand::Convert {
            expression: "100+25".to_string(),
            from: Some(CurrencyCode::Usd),
            save: true,
        },
        AppCommand::History { restore: None },
        AppCommand::History { restore: Some(1) },
        AppCommand::Rates { refresh: false },
        AppCommand::Slots {
            replace: Some((4, CurrencyCode::Try)),
            visible: Some(3),
        },
        AppCommand::Rates { refresh: true },
    ];

    for command in commands {
        info!(?command, "Running command");
        let result = run_command(command, Some(config_path.as_str()), false).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }

    let store = DiskStore::open(&temp_dir.path().join("data")).expect("Failed to open store");
    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source_currency, CurrencyCode::Usd);
    assert_eq!(history[0].source_amount, 125.0);

    let selected = store.load_selected_currencies().await.unwrap().unwrap();
    assert_eq!(
        selected,
        vec![
            CurrencyCode::Gel,
            CurrencyCode::Rub,
            CurrencyCode::Eur,
            CurrencyCode::Try
        ]
    );
    assert_eq!(store.load_visible_count().await.unwrap(), Some(3));

    let rates = store.load_rates().await.unwrap().unwrap();
    assert_eq!(rates.base, CurrencyCode::Eur);
    assert!(rates.is_complete());
}

#[test_log::test(tokio::test)]
async fn test_ephemeral_run_leaves_no_data() {
    let mock_server =
        test_utils::create_rates_server("eur", &complete_eur_response(), 1).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Convert {
            expression: "42".to_string(),
            from: None,
            save: true,
        },
        Some(config_path.as_str()),
        true,
    )
    .await;

    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    assert!(!temp_dir.path().join("data").exists());
}

#[test_log::test(tokio::test)]
async fn test_convert_works_when_rate_server_fails() {
    let mock_server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Convert {
            expression: "10".to_string(),
            from: None,
            save: false,
        },
        Some(config_path.as_str()),
        false,
    )
    .await;

    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_rates_without_any_snapshot() {
    let mock_server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Rates { refresh: true },
        Some(config_path.as_str()),
        true,
    )
    .await;

    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_hidden_currency() {
    let mock_server =
        test_utils::create_rates_server("eur", &complete_eur_response(), 1).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Convert {
            expression: "10".to_string(),
            from: Some(CurrencyCode::Jpy),
            save: false,
        },
        Some(config_path.as_str()),
        false,
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("not in the visible slots"));
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_rejected() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "currencies: [EUR]\nvisible: 2\n").unwrap();

    let result = run_command(
        AppCommand::Rates { refresh: false },
        Some(config_path.to_str().unwrap()),
        true,
    )
    .await;

    assert!(result.is_err());
}
