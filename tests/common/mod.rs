#![allow(dead_code)]

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};

    /// A response read off the wire, split into its parts.
    pub struct RawResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).expect("response body is not JSON")
        }
    }

    /// Send a well-formed request and read the response until the server
    /// closes the connection.
    pub fn send_request(
        addr: SocketAddr,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> RawResponse {
        let mut request = format!("{method} {path} HTTP/1.1\r\nHost: taskstream-test\r\n");
        for (name, value) in headers {
            request.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(body) = body {
            request.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        request.push_str("\r\n");
        if let Some(body) = body {
            request.push_str(body);
        }
        send_raw(addr, &request)
    }

    /// Send raw bytes as-is; useful for deliberately malformed requests.
    pub fn send_raw(addr: SocketAddr, raw: &str) -> RawResponse {
        let mut stream = TcpStream::connect(addr).expect("connect failed");
        stream.write_all(raw.as_bytes()).expect("write failed");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .expect("read failed");
        parse_response(&response)
    }

    fn parse_response(raw: &str) -> RawResponse {
        let (head, body) = raw
            .split_once("\r\n\r\n")
            .expect("response has no head/body separator");
        let mut lines = head.lines();
        let status_line = lines.next().expect("response has no status line");
        let status: u16 = status_line
            .split_whitespace()
            .nth(1)
            .expect("status line has no code")
            .parse()
            .expect("status code is not a number");
        let headers = lines
            .map(|line| {
                let (name, value) = line.split_once(':').expect("bad header line");
                (name.trim().to_string(), value.trim().to_string())
            })
            .collect();
        RawResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }
}
