use super::*;

// =============================================================================
// parse_control_target
// =============================================================================

#[test]
fn control_target_absent_is_log() {
    assert_eq!(parse_control_target(None), Ok(ControlTarget::Log));
}

#[test]
fn control_target_blank_is_log() {
    assert_eq!(parse_control_target(Some("   ")), Ok(ControlTarget::Log));
}

#[test]
fn control_target_udp() {
    assert_eq!(
        parse_control_target(Some("udp://127.0.0.1:9000")),
        Ok(ControlTarget::Udp("127.0.0.1:9000".into()))
    );
}

#[test]
fn control_target_tcp_trims_whitespace() {
    assert_eq!(
        parse_control_target(Some(" tcp://emulator.local:7777 ")),
        Ok(ControlTarget::Tcp("emulator.local:7777".into()))
    );
}

#[test]
fn control_target_rejects_unknown_scheme() {
    assert!(matches!(
        parse_control_target(Some("http://127.0.0.1:80")),
        Err(ConfigError::ControlAddr(_))
    ));
}

#[test]
fn control_target_rejects_missing_scheme() {
    assert!(matches!(
        parse_control_target(Some("127.0.0.1:9000")),
        Err(ConfigError::ControlAddr(_))
    ));
}

#[test]
fn control_target_rejects_missing_port() {
    assert!(matches!(parse_control_target(Some("udp://localhost")), Err(ConfigError::ControlAddr(_))));
}

// =============================================================================
// env_parse — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_parse_unset_returns_default() {
    assert_eq!(env_parse::<u16>("__TEST_RELAY_UNSET_4411__", 3000), Ok(3000));
}

#[test]
fn env_parse_valid_value() {
    let key = "__TEST_RELAY_PORT_5120__";
    unsafe { std::env::set_var(key, " 8080 ") };
    assert_eq!(env_parse::<u16>(key, 3000), Ok(8080));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_invalid_value_is_error() {
    let key = "__TEST_RELAY_PORT_5121__";
    unsafe { std::env::set_var(key, "eighty") };
    assert_eq!(
        env_parse::<u16>(key, 3000),
        Err(ConfigError::InvalidValue { key, value: "eighty".into() })
    );
    unsafe { std::env::remove_var(key) };
}

#[cfg(unix)]
#[test]
fn env_parse_non_unicode_value_is_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let key = "__TEST_RELAY_PORT_5123__";
    unsafe { std::env::set_var(key, OsStr::from_bytes(b"80\xff")) };
    assert!(matches!(env_parse::<u16>(key, 3000), Err(ConfigError::InvalidValue { key: k, .. }) if k == key));
    assert!(matches!(env_string(key), Err(ConfigError::InvalidValue { .. })));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_nonzero_accepts_millis() {
    let key = "__TEST_RELAY_TIMEOUT_5124__";
    unsafe { std::env::set_var(key, "250") };
    assert_eq!(env_parse_nonzero::<u64>(key, 2000), Ok(250));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_nonzero_rejects_zero() {
    let key = "__TEST_RELAY_QUEUE_5122__";
    unsafe { std::env::set_var(key, "0") };
    assert!(matches!(env_parse_nonzero(key, 16), Err(ConfigError::InvalidValue { .. })));
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// RelayConfig
// =============================================================================

#[test]
fn default_config_uses_documented_defaults() {
    let config = RelayConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.default_activity, "DOKAPON_KINGDOM");
    assert_eq!(config.control, ControlTarget::Log);
    assert_eq!(config.client_queue_capacity, 256);
    assert_eq!(config.control_timeout, Duration::from_millis(2000));
}

#[test]
fn listen_addr_ipv4() {
    let config = RelayConfig { bind_addr: "127.0.0.1".into(), port: 9001, ..RelayConfig::default() };
    assert_eq!(config.listen_addr(), "127.0.0.1:9001");
}

#[test]
fn listen_addr_brackets_ipv6() {
    let config = RelayConfig { bind_addr: "::".into(), port: 9001, ..RelayConfig::default() };
    assert_eq!(config.listen_addr(), "[::]:9001");
}

#[test]
fn listen_addr_keeps_existing_brackets() {
    let config = RelayConfig { bind_addr: "[::1]".into(), port: 3000, ..RelayConfig::default() };
    assert_eq!(config.listen_addr(), "[::1]:3000");
}

#[test]
fn config_error_messages_name_the_key() {
    let err = ConfigError::Empty { key: "DEFAULT_ACTIVITY" };
    assert_eq!(err.to_string(), "DEFAULT_ACTIVITY must not be empty");
}
