//! Six-number `h1,h2,h3,h4,p1,p2` host/port encoding used by PASV and PORT.

use crate::core_error::error::{FtpError, FtpResult};
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

static ENCODED_ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+,){5}\d+").expect("valid address regex"));

static PLAIN_ADDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3}):(\d{1,5})$")
        .expect("valid address regex")
});

static EPSV_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\|\|(\d+)\|").expect("valid epsv regex"));

pub const WILDCARD_HOST: &str = "0.0.0.0";

/// Finds the first six-number run in `text` and returns it as `host:port`.
pub fn decode(text: &str) -> FtpResult<String> {
    let found = ENCODED_ADDR_RE
        .find(text)
        .ok_or_else(|| FtpError::InvalidAddressFormat(text.to_string()))?;

    let mut numbers = Vec::with_capacity(6);
    for part in found.as_str().split(',') {
        let n: u8 = part
            .parse()
            .map_err(|_| FtpError::InvalidAddressFormat(text.to_string()))?;
        numbers.push(n);
    }

    let port = u16::from(numbers[4]) * 256 + u16::from(numbers[5]);
    Ok(format!(
        "{}.{}.{}.{}:{}",
        numbers[0], numbers[1], numbers[2], numbers[3], port
    ))
}

/// Encodes an IPv4 host and a decimal port. An empty host stands for the
/// wildcard address.
pub fn encode(host: &str, port: &str) -> FtpResult<String> {
    let host = if host.is_empty() { WILDCARD_HOST } else { host };
    let addr = format!("{}:{}", host, port);

    let caps = PLAIN_ADDR_RE
        .captures(&addr)
        .ok_or_else(|| FtpError::InvalidAddressFormat(addr.clone()))?;

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1]
            .parse()
            .map_err(|_| FtpError::InvalidAddressFormat(addr.clone()))?;
    }
    let port: u16 = caps[5]
        .parse()
        .map_err(|_| FtpError::InvalidAddressFormat(addr.clone()))?;

    let p_lo = port % 256;
    let p_hi = (port - p_lo) / 256;
    trace!("Encoding {} as {:?} port {}/{}", addr, octets, p_hi, p_lo);

    Ok(format!(
        "{},{},{},{},{},{}",
        octets[0], octets[1], octets[2], octets[3], p_hi, p_lo
    ))
}

/// Splits a user supplied `host:port` and encodes it.
pub fn encode_addr(addr: &str) -> FtpResult<String> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| FtpError::InvalidAddressFormat(addr.to_string()))?;
    encode(host, port)
}

/// Extracts the port from an extended passive reply such as `(|||6446|)`.
pub fn decode_epsv_port(text: &str) -> FtpResult<u16> {
    EPSV_PORT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| FtpError::InvalidAddressFormat(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("127.0.0.1", "513").unwrap(), "127,0,0,1,2,1");
        assert_eq!(encode("127.0.0.1", "21").unwrap(), "127,0,0,1,0,21");
        assert_eq!(encode("", "21").unwrap(), "0,0,0,0,0,21");
        assert_eq!(encode("10.1.2.3", "65535").unwrap(), "10,1,2,3,255,255");
    }

    #[test]
    fn test_encode_rejects_malformed() {
        for (host, port) in [
            ("127.0.0.1", ""),
            ("0.0.1", "1234"),
            ("127.0.0.1", "b"),
            ("256.0.0.1", "21"),
            ("127.0.0.1", "65536"),
            ("localhost", "21"),
        ] {
            assert!(
                matches!(encode(host, port), Err(FtpError::InvalidAddressFormat(_))),
                "{}:{}",
                host,
                port
            );
        }
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("127,0,0,1,2,1").unwrap(), "127.0.0.1:513");
        assert_eq!(decode("127,0,0,1,2,0").unwrap(), "127.0.0.1:512");
        assert_eq!(
            decode("227 Entering Passive Mode (192,168,1,20,39,17).").unwrap(),
            "192.168.1.20:10001"
        );
        assert!(decode("127,0,0,1,2").is_err());
        assert!(decode("1,2,,4,5,6").is_err());
        assert!(decode("300,0,0,1,2,1").is_err());
    }

    #[test]
    fn test_round_trip() {
        let hosts = ["127.0.0.1", "0.0.0.0", "255.255.255.255", "10.20.30.40"];
        let ports = [0u16, 1, 255, 256, 257, 2121, 40000, 65534, 65535];
        for host in hosts {
            for port in ports {
                let encoded = encode(host, &port.to_string()).unwrap();
                assert_eq!(decode(&encoded).unwrap(), format!("{}:{}", host, port));
            }
        }
    }

    #[test]
    fn test_encode_addr_and_epsv() {
        assert_eq!(encode_addr("127.0.0.1:1234").unwrap(), "127,0,0,1,4,210");
        assert!(encode_addr("127.0.0.1").is_err());
        assert_eq!(
            decode_epsv_port("229 Entering Extended Passive Mode (|||6446|).").unwrap(),
            6446
        );
        assert!(decode_epsv_port("229 nope").is_err());
    }
}
