use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

const FEED: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="yes"?>
<GANGLIA_XML VERSION="3.1.7" SOURCE="gmond">
<CLUSTER NAME="unspecified" LOCALTIME="1300000000" OWNER="unspecified" LATLONG="unspecified" URL="unspecified">
<HOST NAME="node1" IP="10.0.0.2" REPORTED="1300000000" TN="2" TMAX="20" DMAX="0" LOCATION="unspecified" GMOND_STARTED="1299999000">
<METRIC NAME="load" VAL="5.5" TYPE="float" UNITS=" " TN="10" TMAX="70" DMAX="0" SLOPE="both"/>
<METRIC NAME="mem_free" VAL="9.0" TYPE="float" UNITS="KB" TN="10" TMAX="180" DMAX="0" SLOPE="both"/>
<METRIC NAME="status" VAL="n/a" TYPE="string" UNITS="" TN="10" TMAX="180" DMAX="0" SLOPE="zero"/>
</HOST>
</CLUSTER>
</GANGLIA_XML>
"#;

/// Serves `feed` to the first connection and hands back the port it listens on.
fn serve(feed: &'static str) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(feed.as_bytes()).unwrap();
    });

    (port, handle)
}

fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_check_ganglia"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn warning_when_value_is_between_thresholds() {
    let (port, server) = serve(FEED);
    let port = port.to_string();

    let output = run(&["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "-p", &port]);

    assert_eq!(stdout(&output), "CHECKGANGLIA WARNING: load is 5.50\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.is_empty());
    server.join().unwrap();
}

#[test]
fn critical_when_value_reaches_critical_threshold() {
    let (port, server) = serve(FEED);

    let output = run(&[
        "--host=node1",
        "--metric=mem_free",
        "--warning=4",
        "--critical=8",
        "--server=127.0.0.1",
        &format!("--port={port}"),
    ]);

    assert_eq!(stdout(&output), "CHECKGANGLIA CRITICAL: mem_free is 9.00\n");
    assert_eq!(output.status.code(), Some(2));
    server.join().unwrap();
}

#[test]
fn ok_when_lower_is_worse_and_value_is_high() {
    let (port, server) = serve(FEED);
    let port = port.to_string();

    let output = run(&["-h", "node1", "-m", "mem_free", "-w", "4", "-c", "2", "-p", &port]);

    assert_eq!(stdout(&output), "CHECKGANGLIA OK: mem_free is 9.00\n");
    assert_eq!(output.status.code(), Some(0));
    server.join().unwrap();
}

#[test]
fn unknown_when_host_is_missing() {
    let (port, server) = serve(FEED);
    let port = port.to_string();

    let output = run(&["-h", "node2", "-m", "load", "-w", "4", "-c", "8", "-p", &port]);

    assert_eq!(
        stdout(&output),
        "CHECKGANGLIA UNKNOWN: Error while getting value \"host/value not found\"\n"
    );
    assert_eq!(output.status.code(), Some(3));
    server.join().unwrap();
}

#[test]
fn unknown_when_value_is_not_a_number() {
    let (port, server) = serve(FEED);
    let port = port.to_string();

    let output = run(&["-h", "node1", "-m", "status", "-w", "4", "-c", "8", "-p", &port]);

    let out = stdout(&output);
    assert!(out.starts_with("CHECKGANGLIA UNKNOWN: Error while getting value \""));
    assert!(out.contains("n/a"));
    assert_eq!(out.lines().count(), 1);
    assert_eq!(output.status.code(), Some(3));
    server.join().unwrap();
}

#[test]
fn unknown_when_feed_is_malformed() {
    let (port, server) = serve("<GANGLIA_XML><HOST NAME=\"node1\"></CLUSTER>");
    let port = port.to_string();

    let output = run(&["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "-p", &port]);

    assert!(stdout(&output).starts_with("CHECKGANGLIA UNKNOWN: "));
    assert_eq!(output.status.code(), Some(3));
    server.join().unwrap();
}

#[test]
fn unknown_when_connection_is_refused() {
    let port = unused_port().to_string();

    let output = run(&["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "-p", &port]);

    let out = stdout(&output);
    assert!(out.starts_with(&format!(
        "CHECKGANGLIA UNKNOWN: Error while getting value \"connection to 127.0.0.1:{port} failed"
    )));
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn usage_when_critical_is_missing_and_no_connection_is_made() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let output = run(&["-h", "node1", "-m", "load", "-w", "4", "-p", &port]);

    assert_eq!(
        stdout(&output),
        "Usage: check_ganglia -h|--host= -m|--metric= -w|--warning= -c|--critical= [-s|--server=] [-p|--port=] \n"
    );
    assert_eq!(output.status.code(), Some(3));

    // nothing connected while the plugin was running
    assert!(listener.accept().is_err());
}

#[test]
fn usage_on_invalid_arguments() {
    for args in [
        &["-h", "node1", "-m", "load", "-w", "four", "-c", "8"][..],
        &["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "--bogus"],
        &["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "leftover"],
        &["--help"],
        &[],
    ] {
        let output = run(args);

        let out = stdout(&output);
        assert!(out.starts_with("Usage: check_ganglia "), "{args:?}");
        assert_eq!(out.lines().count(), 1, "{args:?}");
        assert_eq!(output.status.code(), Some(3), "{args:?}");
    }
}

#[test]
fn icinga_command_definition() {
    let output = run(&["--icinga-command"]);

    let out = stdout(&output);
    assert!(out.starts_with("object CheckCommand \"ganglia\" {\n"));
    assert!(out.contains("\"--metric\" = {"));
    assert!(out.contains("vars.ganglia_port = \"8649\""));
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn server_sees_a_closed_connection_after_the_check() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(FEED.as_bytes()).unwrap();
        stream.shutdown(std::net::Shutdown::Write).unwrap();

        // read returns 0 once the plugin has closed its end
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        rest
    });

    let output = run(&["-h", "node1", "-m", "load", "-w", "4", "-c", "8", "-p", &port.to_string()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(server.join().unwrap().is_empty());
}
