use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::ENV_PREFIX;
use crate::types::errors::{Error, ErrorKind, Result};

/// Filesystems the provisioner can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FsType {
    Btrfs,
    Ext4,
    Swap,
    Vfat,
    Xfs,
}

impl FsType {
    pub const ALL: [FsType; 5] = [
        FsType::Btrfs,
        FsType::Ext4,
        FsType::Swap,
        FsType::Vfat,
        FsType::Xfs,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FsType::Btrfs => "btrfs",
            FsType::Ext4 => "ext4",
            FsType::Swap => "swap",
            FsType::Vfat => "vfat",
            FsType::Xfs => "xfs",
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FsType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FsType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::new(ErrorKind::Config, format!("unsupported filesystem: {s}")))
    }
}

/// Device directories, well-known files and helper binaries.
///
/// Fields are private; after construction the registry is read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemPaths {
    disk_by_id_dir: PathBuf,
    disk_by_label_dir: PathBuf,
    disk_by_partuuid_dir: PathBuf,
    oem_device_path: PathBuf,
    kernel_cmdline_path: PathBuf,
    oem_lookaside_dir: PathBuf,
    mdadm_cmd: PathBuf,
    mount_cmd: PathBuf,
    sgdisk_cmd: PathBuf,
    udevadm_cmd: PathBuf,
    btrfs_mkfs_cmd: PathBuf,
    ext4_mkfs_cmd: PathBuf,
    swap_mkfs_cmd: PathBuf,
    vfat_mkfs_cmd: PathBuf,
    xfs_mkfs_cmd: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            disk_by_id_dir: "/dev/disk/by-id".into(),
            disk_by_label_dir: "/dev/disk/by-label".into(),
            disk_by_partuuid_dir: "/dev/disk/by-partuuid".into(),
            oem_device_path: "/dev/disk/by-label/OEM".into(),
            kernel_cmdline_path: "/proc/cmdline".into(),
            // checked in the initramfs before reading from the OEM partition
            oem_lookaside_dir: "/usr/share/oem".into(),
            mdadm_cmd: "/usr/sbin/mdadm".into(),
            mount_cmd: "/usr/bin/mount".into(),
            sgdisk_cmd: "/usr/sbin/sgdisk".into(),
            udevadm_cmd: "/usr/bin/udevadm".into(),
            btrfs_mkfs_cmd: "/usr/sbin/mkfs.btrfs".into(),
            ext4_mkfs_cmd: "/usr/sbin/mkfs.ext4".into(),
            swap_mkfs_cmd: "/usr/sbin/mkswap".into(),
            vfat_mkfs_cmd: "/usr/sbin/mkfs.vfat".into(),
            xfs_mkfs_cmd: "/usr/sbin/mkfs.xfs".into(),
        }
    }
}

/// Partial overlay as read from YAML; absent keys keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Overlay {
    disk_by_id_dir: Option<PathBuf>,
    disk_by_label_dir: Option<PathBuf>,
    disk_by_partuuid_dir: Option<PathBuf>,
    oem_device_path: Option<PathBuf>,
    kernel_cmdline_path: Option<PathBuf>,
    oem_lookaside_dir: Option<PathBuf>,
    mdadm_cmd: Option<PathBuf>,
    mount_cmd: Option<PathBuf>,
    sgdisk_cmd: Option<PathBuf>,
    udevadm_cmd: Option<PathBuf>,
    btrfs_mkfs_cmd: Option<PathBuf>,
    ext4_mkfs_cmd: Option<PathBuf>,
    swap_mkfs_cmd: Option<PathBuf>,
    vfat_mkfs_cmd: Option<PathBuf>,
    xfs_mkfs_cmd: Option<PathBuf>,
}

impl SystemPaths {
    /// Every entry as `(key, slot)`. Keys double as YAML keys and, upper-cased and
    /// prefixed with `PROVISIONER_`, as environment variable names.
    fn slots_mut(&mut self) -> [(&'static str, &mut PathBuf); 15] {
        [
            ("disk_by_id_dir", &mut self.disk_by_id_dir),
            ("disk_by_label_dir", &mut self.disk_by_label_dir),
            ("disk_by_partuuid_dir", &mut self.disk_by_partuuid_dir),
            ("oem_device_path", &mut self.oem_device_path),
            ("kernel_cmdline_path", &mut self.kernel_cmdline_path),
            ("oem_lookaside_dir", &mut self.oem_lookaside_dir),
            ("mdadm_cmd", &mut self.mdadm_cmd),
            ("mount_cmd", &mut self.mount_cmd),
            ("sgdisk_cmd", &mut self.sgdisk_cmd),
            ("udevadm_cmd", &mut self.udevadm_cmd),
            ("btrfs_mkfs_cmd", &mut self.btrfs_mkfs_cmd),
            ("ext4_mkfs_cmd", &mut self.ext4_mkfs_cmd),
            ("swap_mkfs_cmd", &mut self.swap_mkfs_cmd),
            ("vfat_mkfs_cmd", &mut self.vfat_mkfs_cmd),
            ("xfs_mkfs_cmd", &mut self.xfs_mkfs_cmd),
        ]
    }

    /// Overlay the entries present in a YAML mapping.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error on malformed YAML, unknown keys, or relative paths.
    pub fn overlay_yaml(mut self, yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(self);
        }
        let o: Overlay = serde_yaml::from_str(yaml)
            .map_err(|e| Error::new(ErrorKind::Config, format!("system paths: {e}")))?;
        let values = [
            o.disk_by_id_dir,
            o.disk_by_label_dir,
            o.disk_by_partuuid_dir,
            o.oem_device_path,
            o.kernel_cmdline_path,
            o.oem_lookaside_dir,
            o.mdadm_cmd,
            o.mount_cmd,
            o.sgdisk_cmd,
            o.udevadm_cmd,
            o.btrfs_mkfs_cmd,
            o.ext4_mkfs_cmd,
            o.swap_mkfs_cmd,
            o.vfat_mkfs_cmd,
            o.xfs_mkfs_cmd,
        ];
        for ((key, slot), value) in self.slots_mut().into_iter().zip(values) {
            if let Some(v) = value {
                *slot = absolute(key, v)?;
            }
        }
        Ok(self)
    }

    /// Overlay entries from `PROVISIONER_<KEY>` environment variables,
    /// e.g. `PROVISIONER_MDADM_CMD`. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when a variable holds a relative path.
    pub fn overlay_env(mut self) -> Result<Self> {
        for (key, slot) in self.slots_mut() {
            let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            match std::env::var_os(&var) {
                Some(v) if !v.is_empty() => *slot = absolute(&var, PathBuf::from(v))?,
                _ => {}
            }
        }
        Ok(self)
    }

    /// Defaults, then the YAML file at `config` if given, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read, or a `Config` error from
    /// either overlay.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let mut paths = Self::default();
        if let Some(file) = config {
            let text = std::fs::read_to_string(file).map_err(|e| {
                Error::new(ErrorKind::Io, format!("{}: {e}", file.display()))
            })?;
            paths = paths.overlay_yaml(&text)?;
        }
        let paths = paths.overlay_env()?;
        log::debug!("system paths: {paths:?}");
        Ok(paths)
    }

    pub fn disk_by_id_dir(&self) -> &Path {
        &self.disk_by_id_dir
    }
    pub fn disk_by_label_dir(&self) -> &Path {
        &self.disk_by_label_dir
    }
    pub fn disk_by_partuuid_dir(&self) -> &Path {
        &self.disk_by_partuuid_dir
    }
    pub fn oem_device_path(&self) -> &Path {
        &self.oem_device_path
    }
    pub fn kernel_cmdline_path(&self) -> &Path {
        &self.kernel_cmdline_path
    }
    pub fn oem_lookaside_dir(&self) -> &Path {
        &self.oem_lookaside_dir
    }
    pub fn mdadm_cmd(&self) -> &Path {
        &self.mdadm_cmd
    }
    pub fn mount_cmd(&self) -> &Path {
        &self.mount_cmd
    }
    pub fn sgdisk_cmd(&self) -> &Path {
        &self.sgdisk_cmd
    }
    pub fn udevadm_cmd(&self) -> &Path {
        &self.udevadm_cmd
    }

    /// The `mkfs` helper for `fs`.
    pub fn mkfs_cmd(&self, fs: FsType) -> &Path {
        match fs {
            FsType::Btrfs => &self.btrfs_mkfs_cmd,
            FsType::Ext4 => &self.ext4_mkfs_cmd,
            FsType::Swap => &self.swap_mkfs_cmd,
            FsType::Vfat => &self.vfat_mkfs_cmd,
            FsType::Xfs => &self.xfs_mkfs_cmd,
        }
    }
}

fn absolute(key: &str, p: PathBuf) -> Result<PathBuf> {
    if p.is_absolute() {
        Ok(p)
    } else {
        Err(Error::new(
            ErrorKind::Config,
            format!("{key} must be an absolute path, got {}", p.display()),
        ))
    }
}
