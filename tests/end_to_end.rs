//! End-to-end scenarios over real localhost sockets.
//!
//! Each test binds its server to port 0 and runs the serve loop on a
//! background thread; the thread is detached and dies with the test process.

use std::thread;

use kvlite::{DatagramTransport, KvClient, KvServer, Reply, StreamTransport, Transport};

fn spawn_server<T: Transport + Send + 'static>(transport: T) {
    thread::spawn(move || {
        let _ = KvServer::new(transport).run();
    });
}

fn answer<T: Transport>(client: &mut KvClient<T>, text: &str) -> String {
    match client.request(text).unwrap() {
        Reply::Answer(result) => result,
        other => panic!("expected an answer for {text:?}, got {other:?}"),
    }
}

#[test]
fn tcp_put_get_delete_round_trip() {
    let transport = StreamTransport::server("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    spawn_server(transport);

    let mut client = KvClient::new(StreamTransport::client(addr.to_string()));
    client.start().unwrap();

    assert_eq!(answer(&mut client, "PUT apple red"), "Ok.");
    assert_eq!(answer(&mut client, "GET apple"), "red");
    assert_eq!(answer(&mut client, "GET missingkey"), "Key does not exist");
    assert_eq!(answer(&mut client, "DELETE apple"), "Deleted value: red");
    assert_eq!(answer(&mut client, "GET apple"), "Key does not exist");
    assert_eq!(answer(&mut client, "DELETE apple"), "Key does not exist");
}

#[test]
fn tcp_commands_are_case_insensitive() {
    let transport = StreamTransport::server("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    spawn_server(transport);

    let mut client = KvClient::new(StreamTransport::client(addr.to_string()));
    client.start().unwrap();

    assert_eq!(answer(&mut client, "put kiwi green"), "Ok.");
    assert_eq!(answer(&mut client, "geT kiwi"), "green");
}

#[test]
fn tcp_malformed_requests_are_answered_and_leave_the_store_alone() {
    let transport = StreamTransport::server("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    spawn_server(transport);

    let mut client = KvClient::new(StreamTransport::client(addr.to_string()));
    client.start().unwrap();

    // A matched answer implies the error line echoed the request id.
    assert_eq!(
        answer(&mut client, "PUT a b c"),
        "Invalid request format. Usage: PUT key value"
    );
    assert_eq!(
        answer(&mut client, "boop"),
        "Invalid request format. Usage: PUT key value | GET key | DELETE key"
    );
    assert_eq!(
        answer(&mut client, "boop key"),
        "Invalid command. Usage: PUT key value | GET key | DELETE key"
    );
    assert_eq!(answer(&mut client, "GET a"), "Key does not exist");
}

#[test]
fn udp_round_trip_with_two_multiplexed_clients() {
    let transport = DatagramTransport::server("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    spawn_server(transport);

    let mut alice = KvClient::new(DatagramTransport::client(addr).unwrap());
    let mut bob = KvClient::new(DatagramTransport::client(addr).unwrap());
    alice.start().unwrap();
    bob.start().unwrap();

    // Each reply must go to the sender of the most recent datagram, so
    // interleaved requests from two sockets only pass if the server
    // re-derives the peer on every receive.
    assert_eq!(answer(&mut alice, "PUT apple red"), "Ok.");
    assert_eq!(answer(&mut bob, "GET apple"), "red");
    assert_eq!(answer(&mut alice, "DELETE apple"), "Deleted value: red");
    assert_eq!(answer(&mut bob, "GET apple"), "Key does not exist");
}

#[test]
fn udp_malformed_request_echoes_the_request_id() {
    let transport = DatagramTransport::server("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    spawn_server(transport);

    let mut client = KvClient::new(DatagramTransport::client(addr).unwrap());
    client.start().unwrap();

    assert_eq!(
        answer(&mut client, "DELETE a b"),
        "Invalid request format. Usage: DELETE key"
    );
}
