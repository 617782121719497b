//! Registry loading from YAML and the environment.

use std::io::Write;
use std::path::Path;

use provisioner::distro::{FsType, SystemPaths};
use provisioner::types::ErrorKind;
use serial_test::serial;

use crate::helpers::ScopedEnv;

#[test]
#[serial]
fn load_without_config_yields_defaults() {
    let _env = ScopedEnv::clean();
    let p = SystemPaths::load(None).unwrap();
    assert_eq!(p, SystemPaths::default());
}

#[test]
#[serial]
fn env_overrides_defaults() {
    let _env = ScopedEnv::clean()
        .var("PROVISIONER_MDADM_CMD", "/opt/raid/mdadm")
        .var("PROVISIONER_EXT4_MKFS_CMD", "/opt/fs/mkfs.ext4");
    let p = SystemPaths::load(None).unwrap();
    assert_eq!(p.mdadm_cmd(), Path::new("/opt/raid/mdadm"));
    assert_eq!(p.mkfs_cmd(FsType::Ext4), Path::new("/opt/fs/mkfs.ext4"));
    assert_eq!(p.mount_cmd(), Path::new("/usr/bin/mount"));
}

#[test]
#[serial]
fn env_wins_over_yaml() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "udevadm_cmd: /from/yaml/udevadm").unwrap();
    writeln!(f, "kernel_cmdline_path: /run/cmdline").unwrap();
    let _env = ScopedEnv::clean().var("PROVISIONER_UDEVADM_CMD", "/from/env/udevadm");

    let p = SystemPaths::load(Some(f.path())).unwrap();

    assert_eq!(p.udevadm_cmd(), Path::new("/from/env/udevadm"));
    assert_eq!(p.kernel_cmdline_path(), Path::new("/run/cmdline"));
}

#[test]
#[serial]
fn empty_env_value_is_ignored() {
    let _env = ScopedEnv::clean().var("PROVISIONER_SGDISK_CMD", "");
    let p = SystemPaths::load(None).unwrap();
    assert_eq!(p.sgdisk_cmd(), Path::new("/usr/sbin/sgdisk"));
}

#[test]
#[serial]
fn relative_env_path_is_a_config_error() {
    let _env = ScopedEnv::clean().var("PROVISIONER_MOUNT_CMD", "mount");
    let e = SystemPaths::load(None).unwrap_err();
    assert_eq!(e.kind, ErrorKind::Config);
    assert!(e.msg.contains("PROVISIONER_MOUNT_CMD"));
}

#[test]
#[serial]
fn missing_config_file_is_an_io_error() {
    let _env = ScopedEnv::clean();
    let td = tempfile::tempdir().unwrap();
    let e = SystemPaths::load(Some(&td.path().join("absent.yaml"))).unwrap_err();
    assert_eq!(e.kind, ErrorKind::Io);
}
