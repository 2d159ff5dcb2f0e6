use idforge_snowflake::{global, Error, SnowflakeSettings};

// The default is process-wide, so everything about it lives in one test.
#[test]
fn default_generator_installs_once() {
    assert!(global::get().is_none());

    let settings = SnowflakeSettings::builder()
        .datacenter_id(1)
        .machine_id(0)
        .build();
    let generator = global::init(settings.clone()).unwrap();
    assert_eq!(generator.datacenter_id(), 1);

    assert_eq!(global::init(settings).err(), Some(Error::AlreadyInitialized));

    let a = global::get().unwrap().next_id().unwrap();
    let b = generator.next_id().unwrap();
    assert!(a < b);
}
