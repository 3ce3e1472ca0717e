pub mod profile_store;

pub use profile_store::{
    create_redis_client, ProfileKey, ProfileRepository, RedisProfileRepository,
};
