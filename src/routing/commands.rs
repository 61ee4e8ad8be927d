//! Command classification used by mirror policies.

/// Read-only key-value commands. Stored lowercase.
const READ_COMMANDS: &[&str] = &[
    "bitcount",
    "bitfield_ro",
    "bitpos",
    "dump",
    "exists",
    "geodist",
    "geohash",
    "geopos",
    "georadius_ro",
    "georadiusbymember_ro",
    "get",
    "getbit",
    "getrange",
    "hexists",
    "hget",
    "hgetall",
    "hkeys",
    "hlen",
    "hmget",
    "hscan",
    "hstrlen",
    "hvals",
    "lindex",
    "llen",
    "lrange",
    "mget",
    "pfcount",
    "pttl",
    "scard",
    "sismember",
    "smembers",
    "srandmember",
    "sscan",
    "strlen",
    "ttl",
    "type",
    "zcard",
    "zcount",
    "zlexcount",
    "zrange",
    "zrangebylex",
    "zrangebyscore",
    "zrank",
    "zrevrange",
    "zrevrangebylex",
    "zrevrangebyscore",
    "zrevrank",
    "zscan",
    "zscore",
];

/// Returns true if `command` only reads data. Case-insensitive.
pub fn is_read_command(command: &str) -> bool {
    READ_COMMANDS
        .iter()
        .any(|read| read.eq_ignore_ascii_case(command))
}
