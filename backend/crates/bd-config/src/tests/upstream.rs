use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, err, some};
use serial_test::serial;

// =========================================================================
// Validation Tests - Upstream
// =========================================================================

#[test]
#[serial]
fn given_default_patterns_when_matching_vendor_url_then_version_extracted() {
    // Given
    let _temp = setup_config_dir();
    let config = Config::load().unwrap();
    let html = r#"<a href="https://minecraft.azureedge.net/bin-linux/bedrock-server-1.20.0.01.zip" class="btn">"#;

    // When
    let url = config
        .upstream
        .download_regex()
        .unwrap()
        .find(html)
        .map(|m| m.as_str().to_string());
    let version = url.as_deref().and_then(|u| {
        config
            .upstream
            .version_regex()
            .unwrap()
            .captures(u)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    });

    // Then
    assert_that!(
        url.as_deref(),
        some(eq(
            "https://minecraft.azureedge.net/bin-linux/bedrock-server-1.20.0.01.zip"
        ))
    );
    assert_that!(version.as_deref(), some(eq("1.20.0.01")));
}

#[test]
#[serial]
fn given_default_patterns_when_windows_url_then_not_matched() {
    // Given
    let _temp = setup_config_dir();
    let config = Config::load().unwrap();
    let html = r#"<a href="https://minecraft.azureedge.net/bin-win/bedrock-server-1.20.0.01.zip">"#;

    // When
    let found = config.upstream.download_regex().unwrap().find(html);

    // Then
    assert!(found.is_none());
}

#[test]
#[serial]
fn given_invalid_download_pattern_when_validate_then_error_names_field() {
    // Given
    let _temp = setup_config_dir();
    let _pattern = EnvGuard::set("BD_UPSTREAM_DOWNLOAD_PATTERN", "https://(unclosed");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring("upstream.download_pattern"));
}

#[test]
#[serial]
fn given_version_pattern_without_group_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _pattern = EnvGuard::set("BD_UPSTREAM_VERSION_PATTERN", r"bedrock-server-.+\.zip");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_non_http_page_url_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _url = EnvGuard::set("BD_UPSTREAM_PAGE_URL", "ftp://example.com/page");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}
