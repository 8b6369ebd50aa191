//! Dependency cycles that are known to exist in the archive and are tested anyway.
//!
//! Packages in a known cycle are treated as testable once their dependencies outside the cycle
//! are satisfied. This is a hand-maintained list rather than real cycle breaking, so it has to be
//! kept up to date with the archive being tested.

use std::collections::HashSet;

/// Names of packages taking part in accepted dependency cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CyclePolicy {
	known: HashSet<String>,
}

impl CyclePolicy {
	pub fn new(known: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self { known: known.into_iter().map(Into::into).collect() }
	}

	pub fn contains(&self, name: &str) -> bool {
		self.known.contains(name)
	}

	pub fn is_empty(&self) -> bool {
		self.known.is_empty()
	}

	/// The cycles found in Debian over the years.
	pub fn debian() -> Self {
		Self::new(DEBIAN_KNOWN_CYCLES.iter().copied())
	}
}

const DEBIAN_KNOWN_CYCLES: &[&str] = &[
	"libc6", "libgcc1",
	"debconf", "debconf-english", "debconf-i18n",
	"abuse", "abuse-frabs", "abuse-lib",
	"perl", "perl-modules",
	"odbcinst", "odbcinst1debian2",
	"g++-4.4", "libstdc++6-4.4-dev",
	"xserver-xorg", "xserver-xorg-core", "xserver-xorg-input-all", "xserver-xorg-input-evdev",
	"xserver-xorg-input-synaptics", "xserver-xorg-input-wacom", "xserver-xorg-video-all",
	"xserver-xorg-video-apm", "xserver-xorg-video-ark", "xserver-xorg-video-ati",
	"xserver-xorg-video-chips", "xserver-xorg-video-cirrus", "xserver-xorg-video-fbdev",
	"xserver-xorg-video-geode", "xserver-xorg-video-i128", "xserver-xorg-video-i740",
	"xserver-xorg-video-intel", "xserver-xorg-video-mach64", "xserver-xorg-video-mga",
	"xserver-xorg-video-neomagic", "xserver-xorg-video-nouveau", "xserver-xorg-video-nv",
	"xserver-xorg-video-openchrome", "xserver-xorg-video-r128", "xserver-xorg-video-radeon",
	"xserver-xorg-video-rendition", "xserver-xorg-video-s3", "xserver-xorg-video-s3virge",
	"xserver-xorg-video-savage", "xserver-xorg-video-siliconmotion", "xserver-xorg-video-sis",
	"xserver-xorg-video-sisusb", "xserver-xorg-video-tdfx", "xserver-xorg-video-trident",
	"xserver-xorg-video-tseng", "xserver-xorg-video-vesa", "xserver-xorg-video-vmware",
	"xserver-xorg-video-voodoo",
	"fglrx-driver", "fglrx-glx",
	"ca-certificates-java", "openjdk-6-jre-headless", "openjdk-6-jre-lib",
	"sun-java6-bin", "sun-java6-jre",
	"default-jre", "libaccess-bridge-java", "libaccess-bridge-java-jni", "openjdk-6-jre",
	"dmsetup", "libdevmapper1.02.1",
	"uqm", "uqm-content",
	"acheck", "acheck-rules",
	"console-common", "kbd",
	"aide", "aide-common",
	"exim4", "exim4-base", "exim4-daemon-heavy", "exim4-daemon-light", "fcron",
	"libmono-corlib2.0-cil", "libmono-posix2.0-cil", "libmono-security2.0-cil",
	"libmono-system2.0-cil", "mono-2.0-gac", "mono-gac", "mono-runtime",
	"libmono-sqlite2.0-cil", "libmono-system-data2.0-cil", "libmono-system-web2.0-cil",
	"libmono-wcf3.0-cil", "libmono2.0-cil",
	"gamin", "libgamin0",
	"xemacs21", "xemacs21-bin", "xemacs21-mule", "xemacs21-mule-canna-wnn", "xemacs21-nomule", "xemacs21-support",
	"python-imaging", "python-imaging-tk",
	"monodoc-browser", "monodoc-http", "monodoc-manual",
	"iamerican", "ispell",
	"bible-kjv", "bible-kjv-text",
	"bochs", "bochs-wx",
	"g++-4.3", "libstdc++6-4.3-dev",
	"bootcd", "bootcd-hppa", "bootcd-i386", "bootcd-ia64",
	"cl-asdf", "common-lisp-controller",
	"libcherokee-config0", "libcherokee-server0",
	"cowbuilder", "cowdancer",
	"tasksel", "tasksel-data",
	"python-netcdf", "python-scientific",
	"gcj-4.4-jdk", "libgcj10-dev",
	"gdc-4.3", "libphobos-4.3-dev",
	"pcb-common", "pcb-gtk", "pcb-lesstif",
	"ggz-gtk-games", "ggz-gtk-games-data",
	"ggz-kde-games", "ggz-kde-games-data",
	"ggz-sdl-games", "ggz-sdl-games-data",
	"gnuift", "gnuift-perl",
	"heroes-common", "heroes-ggi", "heroes-sdl",
	"kopete", "libkopete4",
	"kchart", "koffice-libs",
	"strongswan-ikev1", "strongswan-ikev2", "strongswan-nm", "strongswan-starter",
	"cli-uno-bridge", "libuno-cli-cppuhelper1.0-cil",
	"klogd", "sysklogd",
];

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn debian_list_has_libc() { assert!(CyclePolicy::debian().contains("libc6")) }
	#[test] fn default_is_empty() { assert!(CyclePolicy::default().is_empty()) }
}
