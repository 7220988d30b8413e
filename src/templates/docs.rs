//! README and commit message.

use std::fmt::Write as _;

use super::RenderContext;

fn yes_no(present: bool) -> &'static str {
    if present {
        "yes"
    } else {
        "no"
    }
}

pub(super) fn readme_md(ctx: &RenderContext<'_>) -> String {
    let device = ctx.device;
    let image = ctx.image;
    let mut out = String::from(
        r#"# Device tree for {{ brand }} {{ model }} ({{ codename }})

The {{ brand }} {{ model }} (codenamed _"{{ codename }}"_) is a device from {{ manufacturer }}.

## Device specifications

| Basic                   | Spec Sheet |
| ----------------------: | :--------- |
"#,
    );
    let mut row = |name: &str, value: &str| {
        let _ = writeln!(out, "| {name:>23} | {value} |");
    };
    row("Platform", device.platform.as_deref().unwrap_or("unknown"));
    row("CPU architecture", device.arch.target_arch());
    row("A/B", yes_no(device.is_ab));
    if let Some(sdk) = device.sdk_version {
        row("Android SDK", &sdk.to_string());
    }
    if let Some(density) = device.screen_density {
        row("Screen density", &density.to_string());
    }

    out.push_str("\n## Prebuilt artifacts\n\n| Artifact | Included |\n| :------- | :------- |\n");
    for (name, present) in [
        ("kernel", image.kernel.is_some()),
        ("dt.img", image.dt.is_some()),
        ("dtb.img", image.dtb.is_some()),
        ("dtbo.img", image.dtbo.is_some()),
    ] {
        let _ = writeln!(out, "| {name} | {} |", yes_no(present));
    }

    let target = if device.is_ab { "bootimage" } else { "recoveryimage" };
    let _ = write!(
        out,
        r#"
## Building

```bash
source build/envsetup.sh
lunch omni_{{{{ codename }}}}-eng
mka {target}
```
"#
    );
    out
}

pub(super) fn commit_message(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from(
        "{{ manufacturer }}/{{ codename }}: Initial recovery device tree\n\n\
         Generated by recovery-dtgen {{ version }}\n\
         Model: {{ brand }} {{ model }}\n",
    );
    if let Some(fingerprint) = &ctx.device.fingerprint {
        let _ = writeln!(out, "Fingerprint: {fingerprint}");
    }
    out
}
