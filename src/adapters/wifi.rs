//! WiFi station bring-up for the ESP32 target.
//!
//! The UDP links sit on lwIP sockets, which are unusable until esp-netif
//! has an interface up.  [`connect_station`] brings the STA interface up
//! and blocks until it has an address; the returned handle must outlive
//! every socket.
//!
//! Credential checks run on every target so a bad config is rejected at
//! load time rather than on the device.

use core::fmt;

use crate::config::WifiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

impl std::error::Error for WifiError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(WifiError::InvalidSsid);
    }
    if !ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

/// Check station credentials.  An empty SSID means "not configured".
pub fn validate_credentials(cfg: &WifiConfig) -> Result<(), WifiError> {
    if cfg.ssid.is_empty() {
        return Err(WifiError::NoCredentials);
    }
    validate_ssid(&cfg.ssid)?;
    validate_password(&cfg.password)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::{Station, connect_station};

#[cfg(target_os = "espidf")]
mod esp {
    use anyhow::{Context, Result, anyhow};
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::info;

    use super::validate_credentials;
    use crate::config::WifiConfig;

    /// Live STA interface.  Dropping it tears the network down.
    pub type Station = BlockingWifi<EspWifi<'static>>;

    /// Join the configured access point and wait for the netif to come up.
    pub fn connect_station(modem: Modem, cfg: &WifiConfig) -> Result<Station> {
        validate_credentials(cfg)?;

        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

        let auth_method = if cfg.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: cfg
                .ssid
                .as_str()
                .try_into()
                .map_err(|()| anyhow!("SSID does not fit"))?,
            password: cfg
                .password
                .as_str()
                .try_into()
                .map_err(|()| anyhow!("password does not fit"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
        info!("WiFi: started, joining '{}'", cfg.ssid);
        wifi.connect().with_context(|| format!("joining '{}'", cfg.ssid))?;
        wifi.wait_netif_up()?;

        let ip = wifi.wifi().sta_netif().get_ip_info()?;
        info!("WiFi: netif up, ip={}", ip.ip);
        Ok(wifi)
    }
}
