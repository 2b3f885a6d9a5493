use redis::aio::MultiplexedConnection;
use redis::{RedisError, Value};
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};

use kvstore::config::Config;
use kvstore::server::run;

const PORT: u16 = 6380;

/// Starts a server on the runtime of the calling test. It stops with that runtime, so every test
/// gets a fresh one on the same port.
async fn start_server() {
    tokio::spawn(run(Config::with_port(PORT)));
    sleep(Duration::from_millis(100)).await;
}

async fn connect() -> Result<MultiplexedConnection, RedisError> {
    start_server().await;

    let client = redis::Client::open(format!("redis://127.0.0.1:{}/", PORT))?;
    let mut connection = client.get_multiplexed_async_connection().await?;

    // The same server is shared by all tests, start fresh.
    let _: () = redis::cmd("FLUSHDB").query_async(&mut connection).await?;

    Ok(connection)
}

async fn connect_raw() -> TcpStream {
    start_server().await;

    let mut stream = TcpStream::connect(("127.0.0.1", PORT)).await.unwrap();
    assert_eq!(exchange(&mut stream, &["FLUSHDB"]).await, b"+OK\r\n");
    stream
}

fn encode(args: &[&str]) -> Vec<u8> {
    let mut bytes = format!("*{}\r\n", args.len()).into_bytes();
    for arg in args {
        bytes.extend_from_slice(format!("${}\r\n{}\r\n", arg.len(), arg).as_bytes());
    }
    bytes
}

/// Sends one request and reads whatever the server answers within a short delay.
async fn exchange(stream: &mut TcpStream, args: &[&str]) -> Vec<u8> {
    stream.write_all(&encode(args)).await.unwrap();
    read_available(stream).await
}

async fn read_available(stream: &mut TcpStream) -> Vec<u8> {
    let mut res = vec![];
    let mut buf = [0; 4096];

    while let Ok(Ok(n)) = timeout(Duration::from_millis(100), stream.read(&mut buf)).await {
        if n == 0 {
            break;
        }
        res.extend_from_slice(&buf[..n]);
    }

    res
}

async fn query_err(connection: &mut MultiplexedConnection, cmd: &redis::Cmd) -> String {
    let res: Result<Value, RedisError> = cmd.query_async(connection).await;
    let err = res.unwrap_err();

    // The client splits the `ERR` code from the message sent by the server.
    err.detail().unwrap_or_default().to_string()
}

#[tokio::test]
#[serial]
async fn test_set_and_get() {
    let mut con = connect().await.unwrap();

    let (a, b, c, missing): (String, String, Vec<u8>, Option<String>) = redis::pipe()
        .cmd("SET")
        .arg("set_get_key_1")
        .arg(1)
        .ignore()
        .cmd("SET")
        .arg("set_get_key_2")
        .arg("Argentina")
        .ignore()
        .cmd("SET")
        .arg("set_get_key_3")
        .arg(&b"Hello,\r\nWorld!\x00"[..])
        .ignore()
        .cmd("GET")
        .arg("set_get_key_1")
        .cmd("GET")
        .arg("set_get_key_2")
        .cmd("GET")
        .arg("set_get_key_3")
        .cmd("GET")
        .arg("set_get_nonexistentkey")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(a, "1");
    assert_eq!(b, "Argentina");
    assert_eq!(c, b"Hello,\r\nWorld!\x00");
    assert_eq!(missing, None);
}

#[tokio::test]
#[serial]
async fn test_del_and_exists() {
    let mut con = connect().await.unwrap();

    let (exists, deleted, not_deleted, exists_after): (i64, i64, i64, i64) = redis::pipe()
        .cmd("SET")
        .arg("del_key_1")
        .arg(1)
        .ignore()
        .cmd("SADD")
        .arg("del_key_2")
        .arg("a")
        .ignore()
        .cmd("EXISTS")
        .arg("del_key_1")
        .arg("del_key_2")
        .arg("del_key_3")
        .cmd("DEL")
        .arg("del_key_1")
        .arg("del_key_2")
        .arg("del_key_3")
        .cmd("DEL")
        .arg("del_nonexistentkey")
        .cmd("EXISTS")
        .arg("del_key_1")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(exists, 2);
    assert_eq!(deleted, 2);
    assert_eq!(not_deleted, 0);
    assert_eq!(exists_after, 0);
}

#[tokio::test]
#[serial]
async fn test_keys() {
    let mut con = connect().await.unwrap();

    for key in ["user:1", "user:2", "session:1"] {
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg("value")
            .query_async(&mut con)
            .await
            .unwrap();
    }

    let mut all: Vec<String> = redis::cmd("KEYS").arg("*").query_async(&mut con).await.unwrap();
    all.sort();
    let users: Vec<String> = redis::cmd("KEYS").arg("user*").query_async(&mut con).await.unwrap();
    let ones: Vec<String> = redis::cmd("KEYS").arg("*:1").query_async(&mut con).await.unwrap();

    assert_eq!(all, vec!["session:1", "user:1", "user:2"]);
    assert_eq!(users, vec!["user:1", "user:2"]);
    assert_eq!(ones, vec!["session:1", "user:1"]);
}

#[tokio::test]
#[serial]
async fn test_sets() {
    let mut con = connect().await.unwrap();

    let (added, added_again, card, members, is_member, inter, union): (
        i64,
        i64,
        i64,
        Vec<String>,
        bool,
        Vec<String>,
        Vec<String>,
    ) = redis::pipe()
        .cmd("SADD")
        .arg("set_1")
        .arg(&["c", "a", "b"])
        .cmd("SADD")
        .arg("set_1")
        .arg("a")
        .cmd("SCARD")
        .arg("set_1")
        .cmd("SMEMBERS")
        .arg("set_1")
        .cmd("SISMEMBER")
        .arg("set_1")
        .arg("b")
        .cmd("SADD")
        .arg("set_2")
        .arg(&["b", "c", "d"])
        .ignore()
        .cmd("SINTER")
        .arg("set_1")
        .arg("set_2")
        .cmd("SUNION")
        .arg("set_1")
        .arg("set_2")
        .arg("set_missing")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(added, 3);
    assert_eq!(added_again, 0);
    assert_eq!(card, 3);
    assert_eq!(members, vec!["a", "b", "c"]);
    assert!(is_member);
    assert_eq!(inter, vec!["b", "c"]);
    assert_eq!(union, vec!["a", "b", "c", "d"]);

    let removed: i64 = redis::cmd("SREM")
        .arg("set_2")
        .arg(&["b", "c", "d"])
        .query_async(&mut con)
        .await
        .unwrap();
    let kind: String = redis::cmd("TYPE").arg("set_2").query_async(&mut con).await.unwrap();

    assert_eq!(removed, 3);
    assert_eq!(kind, "none");
}

#[tokio::test]
#[serial]
async fn test_sorted_sets() {
    let mut con = connect().await.unwrap();

    let (added, card, by_index, by_score, with_scores, score): (
        i64,
        i64,
        Vec<String>,
        Vec<String>,
        Vec<String>,
        f64,
    ) = redis::pipe()
        .cmd("ZADD")
        .arg("board")
        .arg(&["4.5", "A", "4.0", "B", "3.5", "C", "3.0", "D", "2.0", "E", "1.0", "F"])
        .cmd("ZCARD")
        .arg("board")
        .cmd("ZRANGE")
        .arg("board")
        .arg(1)
        .arg(2)
        .cmd("ZRANGE")
        .arg("board")
        .arg(2)
        .arg(4)
        .arg("BYSCORE")
        .cmd("ZRANGE")
        .arg("board")
        .arg(2)
        .arg(3)
        .arg("BYSCORE")
        .arg("WITHSCORES")
        .cmd("ZSCORE")
        .arg("board")
        .arg("A")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(added, 6);
    assert_eq!(card, 6);
    assert_eq!(by_index, vec!["B", "C"]);
    assert_eq!(by_score, vec!["E", "D", "C", "B"]);
    assert_eq!(with_scores, vec!["E", "2", "D", "3"]);
    assert_eq!(score, 4.5);

    let (removed, zrem, remaining, kind): (i64, i64, i64, String) = redis::pipe()
        .cmd("ZREMRANGEBYSCORE")
        .arg("board")
        .arg(2)
        .arg(4)
        .cmd("ZREM")
        .arg("board")
        .arg(&["A", "F", "Z"])
        .cmd("EXISTS")
        .arg("board")
        .cmd("TYPE")
        .arg("board")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(removed, 4);
    assert_eq!(zrem, 2);
    assert_eq!(remaining, 0);
    assert_eq!(kind, "none");
}

#[tokio::test]
#[serial]
async fn test_select_isolates_databases() {
    let mut con = connect().await.unwrap();

    let (in_zero, in_one, size_one, back_in_zero): (String, Option<String>, i64, String) =
        redis::pipe()
            .cmd("SET")
            .arg("select_key")
            .arg("zero")
            .ignore()
            .cmd("TYPE")
            .arg("select_key")
            .cmd("SELECT")
            .arg(1)
            .ignore()
            .cmd("GET")
            .arg("select_key")
            .cmd("DBSIZE")
            .cmd("SELECT")
            .arg(0)
            .ignore()
            .cmd("GET")
            .arg("select_key")
            .query_async(&mut con)
            .await
            .unwrap();

    assert_eq!(in_zero, "string");
    assert_eq!(in_one, None);
    assert_eq!(size_one, 0);
    assert_eq!(back_in_zero, "zero");
}

#[tokio::test]
#[serial]
async fn test_client() {
    let mut con = connect().await.unwrap();

    let (unnamed, name, info): (Option<String>, String, String) = redis::pipe()
        .cmd("CLIENT")
        .arg("GETNAME")
        .cmd("CLIENT")
        .arg("SETNAME")
        .arg("integration")
        .ignore()
        .cmd("CLIENT")
        .arg("SETINFO")
        .arg("LIB-NAME")
        .arg("redis-rs")
        .ignore()
        .cmd("CLIENT")
        .arg("GETNAME")
        .cmd("CLIENT")
        .arg("INFO")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(unnamed, None);
    assert_eq!(name, "integration");
    assert!(info.contains(" name=integration db=0 lib-name=redis-rs "));
}

#[tokio::test]
#[serial]
async fn test_errors() {
    let mut con = connect().await.unwrap();

    let _: () = redis::cmd("SET")
        .arg("errors_key")
        .arg("value")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(
        query_err(&mut con, redis::cmd("SADD").arg("errors_key").arg("a")).await,
        "WRONGTYPE Operation against a key holding the wrong kind of value"
    );
    assert_eq!(
        query_err(&mut con, &redis::cmd("GET")).await,
        "wrong number of arguments for command"
    );
    assert_eq!(
        query_err(&mut con, redis::cmd("SELECT").arg(8)).await,
        "value is not an integer or out of range"
    );
    assert_eq!(
        query_err(
            &mut con,
            redis::cmd("ZRANGE").arg("errors_key").arg(0).arg(1).arg("REV")
        )
        .await,
        "WRONGTYPE Operation against a key holding the wrong kind of value"
    );
    assert_eq!(
        query_err(&mut con, &redis::cmd("FLUSHALL")).await,
        "unknown command 'FLUSHALL'"
    );

    let value: String = redis::cmd("GET")
        .arg("errors_key")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(value, "value");
}

#[tokio::test]
#[serial]
async fn test_wire_format() {
    let mut stream = connect_raw().await;

    assert_eq!(exchange(&mut stream, &["PING"]).await, b"+PONG\r\n");
    assert_eq!(exchange(&mut stream, &["SET", "k", "v"]).await, b"+OK\r\n");
    assert_eq!(exchange(&mut stream, &["GET", "k"]).await, b"$1\r\nv\r\n");
    assert_eq!(exchange(&mut stream, &["TYPE", "k"]).await, b"$6\r\nstring\r\n");
    assert_eq!(exchange(&mut stream, &["GET", "nope"]).await, b"$-1\r\n");
    assert_eq!(exchange(&mut stream, &["EXISTS", "k"]).await, b":+1\r\n");
    assert_eq!(exchange(&mut stream, &["EXISTS", "nope"]).await, b":0\r\n");
    assert_eq!(exchange(&mut stream, &["SMEMBERS", "nope"]).await, b"*0\r\n");
    assert_eq!(
        exchange(&mut stream, &["ZADD", "z", "1.5", "a"]).await,
        b":+1\r\n"
    );
    assert_eq!(
        exchange(&mut stream, &["ZRANGE", "z", "0", "0", "WITHSCORES"]).await,
        b"*2\r\n$1\r\na\r\n$3\r\n1.5\r\n"
    );
    assert_eq!(
        exchange(&mut stream, &["DBSIZE", "extra"]).await,
        b"-ERR wrong number of arguments for command\r\n"
    );
}

#[tokio::test]
#[serial]
async fn test_pipelined_requests() {
    let mut stream = connect_raw().await;

    let mut requests = encode(&["SADD", "s", "a", "b"]);
    requests.extend(encode(&["SCARD", "s"]));
    requests.extend(encode(&["PING"]));
    stream.write_all(&requests).await.unwrap();

    assert_eq!(read_available(&mut stream).await, b":+2\r\n:+2\r\n+PONG\r\n");
}

#[tokio::test]
#[serial]
async fn test_malformed_request_has_no_reply() {
    let mut stream = connect_raw().await;

    stream.write_all(b"PING\r\n").await.unwrap();
    assert_eq!(read_available(&mut stream).await, b"");

    stream.write_all(b"*1\r\n:1\r\n").await.unwrap();
    assert_eq!(read_available(&mut stream).await, b"");

    // The connection is still served.
    assert_eq!(exchange(&mut stream, &["PING"]).await, b"+PONG\r\n");

    // Only the malformed part of a pipeline goes unanswered.
    let mut requests = b"GET k\r\n".to_vec();
    requests.extend(encode(&["PING"]));
    stream.write_all(&requests).await.unwrap();
    assert_eq!(read_available(&mut stream).await, b"+PONG\r\n");
}
