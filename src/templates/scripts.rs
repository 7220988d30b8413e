//! Shell script bodies.

const HELPER_PREAMBLE: &str = r#"set -e

DEVICE={{ codename }}
VENDOR={{ manufacturer }}

# Load extract_utils and do some sanity checks
MY_DIR="${BASH_SOURCE%/*}"
if [[ ! -d "${MY_DIR}" ]]; then MY_DIR="${PWD}"; fi

ANDROID_ROOT="${MY_DIR}/../../.."

HELPER="${ANDROID_ROOT}/tools/extract-utils/extract_utils.sh"
if [ ! -f "${HELPER}" ]; then
    echo "Unable to find helper script at ${HELPER}"
    exit 1
fi
source "${HELPER}"
"#;

pub(super) fn extract_files_sh() -> String {
    format!(
        "#!/bin/bash\n{HELPER_PREAMBLE}{}",
        r#"
# Default to sanitizing the vendor folder before extraction
CLEAN_VENDOR=true

KANG=
SECTION=

while [ "${#}" -gt 0 ]; do
    case "${1}" in
        -n | --no-cleanup )
                CLEAN_VENDOR=false
                ;;
        -k | --kang )
                KANG="--kang"
                ;;
        -s | --section )
                SECTION="${2}"; shift
                CLEAN_VENDOR=false
                ;;
        * )
                SRC="${1}"
                ;;
    esac
    shift
done

if [ -z "${SRC}" ]; then
    SRC="adb"
fi

# Initialize the helper
setup_vendor "${DEVICE}" "${VENDOR}" "${ANDROID_ROOT}" false "${CLEAN_VENDOR}"

extract "${MY_DIR}/proprietary-files.txt" "${SRC}" "${KANG}" --section "${SECTION}"

"${MY_DIR}/setup-makefiles.sh"
"#
    )
}

pub(super) fn setup_makefiles_sh() -> String {
    format!(
        "#!/bin/bash\n{HELPER_PREAMBLE}{}",
        r#"
# Initialize the helper
setup_vendor "${DEVICE}" "${VENDOR}" "${ANDROID_ROOT}"

# Warning headers and guards
write_headers

write_makefiles "${MY_DIR}/proprietary-files.txt" true

# Finish
write_footers
"#
    )
}

pub(super) fn vendorsetup_sh() -> String {
    r#"add_lunch_combo omni_{{ codename }}-user
add_lunch_combo omni_{{ codename }}-userdebug
add_lunch_combo omni_{{ codename }}-eng
"#
    .to_string()
}
