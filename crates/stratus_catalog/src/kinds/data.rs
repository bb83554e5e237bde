//! Databases, caches, and queues.

use stratus_foundation::{AttrMap, Result, Type, Value, attrs};
use stratus_schema::{
    AttributeSchema, Constraint, FieldSchema, FieldType, ValidatedAttributes, Validator, Violation,
};
use stratus_synth::{OutputBundle, ResourceKind, SynthesisContext, submit_kind};

use super::is_instance_class;

pub(super) const PROVIDER: &str = module_path!();
pub(super) const DEFINITIONS: &[super::Define] =
    &[db_instance_kind, elasticache_cluster_kind, sqs_queue_kind];

/// Kind name of a relational database instance.
pub const DB_INSTANCE: &str = "aws_db_instance";
/// Kind name of a cache cluster.
pub const ELASTICACHE_CLUSTER: &str = "aws_elasticache_cluster";
/// Kind name of a message queue.
pub const SQS_QUEUE: &str = "aws_sqs_queue";

/// Default listener port for a database or cache engine.
#[must_use]
pub fn default_port(engine: &str) -> Option<i64> {
    match engine {
        "postgres" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "redis" => Some(6379),
        "memcached" => Some(11211),
        _ => None,
    }
}

fn engine_port(attrs: &ValidatedAttributes) -> AttrMap {
    match attrs.str("engine").ok().and_then(default_port) {
        Some(port) => attrs! { "default_port" => port },
        None => AttrMap::new(),
    }
}

fn db_instance_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(DB_INSTANCE)
        .with_field(
            FieldSchema::optional("engine", Type::String, "postgres")
                .with_constraint(Constraint::one_of(["postgres", "mysql", "mariadb"])),
        )
        .with_field(FieldSchema::optional_unset("engine_version", Type::String))
        .with_field(
            FieldSchema::required("instance_class", Type::String).with_constraint(
                Constraint::predicate("a database class such as db.t3.micro", |v| {
                    v.as_str().is_none_or(|s| s.starts_with("db.")) && is_instance_class(v)
                }),
            ),
        )
        .with_field(
            FieldSchema::optional("allocated_storage", Type::Int, 20)
                .with_constraint(Constraint::range(20.0, 65_536.0)),
        )
        .with_field(FieldSchema::optional("multi_az", Type::Bool, false))
        .with_field(
            FieldSchema::optional("backup_retention_period", Type::Int, 1)
                .with_constraint(Constraint::range(0.0, 35.0)),
        )
        .with_field(FieldSchema::optional("deletion_protection", Type::Bool, false))
        .with_field(FieldSchema::optional("storage_encrypted", Type::Bool, true))
        .with_field(
            FieldSchema::required("subnet_ids", Type::list(Type::String))
                .with_constraint(Constraint::non_empty()),
        )
        .with_field(FieldSchema::optional(
            "vpc_security_group_ids",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional_unset("tags", FieldType::map_of(Type::String)));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "endpoint", "address", "port"])
        .with_computed(engine_port)
        .describe("Managed relational database instance")
}

submit_kind!(db_instance_kind);

fn elasticache_cluster_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(ELASTICACHE_CLUSTER)
        .with_field(
            FieldSchema::optional("engine", Type::String, "redis")
                .with_constraint(Constraint::one_of(["redis", "memcached"])),
        )
        .with_field(
            FieldSchema::required("node_type", Type::String).with_constraint(
                Constraint::predicate("a cache node type such as cache.t3.micro", |v| {
                    v.as_str().is_none_or(|s| s.starts_with("cache.")) && is_instance_class(v)
                }),
            ),
        )
        .with_field(
            FieldSchema::optional("num_cache_nodes", Type::Int, 1)
                .with_constraint(Constraint::range(1.0, 40.0)),
        )
        .with_field(
            FieldSchema::required("subnet_ids", Type::list(Type::String))
                .with_constraint(Constraint::non_empty()),
        )
        .with_field(FieldSchema::optional(
            "security_group_ids",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_validator(Validator::custom("single-node redis", |attrs| {
            let redis = attrs.get("engine").and_then(Value::as_str) == Some("redis");
            let nodes = attrs.get("num_cache_nodes").and_then(Value::as_int)?;
            (redis && nodes != 1)
                .then(|| Violation::field("num_cache_nodes", "redis clusters have exactly one node"))
        }));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "endpoint", "port"])
        .with_computed(engine_port)
        .describe("In-memory cache cluster")
}

submit_kind!(elasticache_cluster_kind);

fn sqs_queue_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(SQS_QUEUE)
        .with_field(FieldSchema::optional("fifo", Type::Bool, false))
        .with_field(FieldSchema::optional_unset("content_based_deduplication", Type::Bool))
        .with_field(
            FieldSchema::optional("visibility_timeout_seconds", Type::Int, 30)
                .with_constraint(Constraint::range(0.0, 43_200.0)),
        )
        .with_field(
            FieldSchema::optional("message_retention_seconds", Type::Int, 345_600)
                .with_constraint(Constraint::range(60.0, 1_209_600.0)),
        )
        .with_field(FieldSchema::optional_unset("dead_letter_arn", Type::String))
        .with_field(
            FieldSchema::optional_unset("max_receive_count", Type::Int)
                .with_constraint(Constraint::range(1.0, 1000.0)),
        )
        .with_validator(Validator::requires("max_receive_count", "dead_letter_arn"))
        .with_validator(Validator::custom("deduplication needs fifo", |attrs| {
            let dedup = attrs.get("content_based_deduplication").and_then(Value::as_bool)?;
            let fifo = attrs.get("fifo").and_then(Value::as_bool).unwrap_or(false);
            (dedup && !fifo).then(|| {
                Violation::field("content_based_deduplication", "only FIFO queues deduplicate")
            })
        }));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "url"])
        .with_computed(|attrs| {
            let kind = if attrs.flag("fifo") { "fifo" } else { "standard" };
            attrs! { "queue_type" => kind }
        })
        .describe("Managed message queue")
}

submit_kind!(sqs_queue_kind);

/// Declares an `aws_db_instance`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn db_instance(ctx: &mut SynthesisContext, name: &str, attrs: &AttrMap) -> Result<OutputBundle> {
    ctx.declare(DB_INSTANCE, name, attrs)
}

/// Declares an `aws_elasticache_cluster`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn elasticache_cluster(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(ELASTICACHE_CLUSTER, name, attrs)
}

/// Declares an `aws_sqs_queue`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn sqs_queue(ctx: &mut SynthesisContext, name: &str, attrs: &AttrMap) -> Result<OutputBundle> {
    ctx.declare(SQS_QUEUE, name, attrs)
}
