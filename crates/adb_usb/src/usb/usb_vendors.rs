/// Vendor ids of manufacturers known to ship devices with an ADB interface.
pub const USB_VENDOR_IDS: &[u16] = &[
    0x0409, // NEC
    0x0414, // Gigabyte
    0x0471, // Philips
    0x0482, // Kyocera
    0x0489, // Foxconn
    0x04c5, // Fujitsu
    0x04da, // Panasonic
    0x04dd, // Sharp
    0x04e8, // Samsung
    0x0502, // Acer
    0x054c, // Sony
    0x05c6, // Qualcomm
    0x091e, // Garmin-Asus
    0x0930, // Toshiba
    0x0955, // Nvidia
    0x0b05, // Asus
    0x0bb4, // HTC
    0x0db0, // MSI
    0x0e79, // Archos
    0x0e8d, // MediaTek
    0x0fce, // Sony Ericsson
    0x1004, // LG
    0x109b, // Hisense
    0x10a9, // Pantech
    0x12d1, // Huawei
    0x16d5, // AnyDATA
    0x1782, // Spreadtrum
    0x17ef, // Lenovo
    0x18d1, // Google
    0x1949, // Lab126 (Amazon)
    0x19d2, // ZTE
    0x1bbb, // T & A Mobile Phones
    0x1d4d, // Pegatron
    0x1ebf, // Yulong Coolpad
    0x1f3a, // Allwinner
    0x1f53, // SK Telesys
    0x2080, // Barnes & Noble
    0x2207, // Rockchip
    0x2237, // Kobo
    0x2257, // OTGV
    0x22b8, // Motorola
    0x22d9, // Oppo
    0x2340, // Teleepoch
    0x25e3, // Lumigon
    0x2717, // Xiaomi
    0x2836, // Ouya
    0x2916, // Yota
    0x2a45, // Meizu
    0x2a70, // OnePlus
    0x2ae5, // Fairphone
    0x2d95, // Vivo
    0x413c, // Dell
    0x8087, // Intel
];

pub fn is_known_vendor(vendor_id: u16) -> bool {
    USB_VENDOR_IDS.contains(&vendor_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(USB_VENDOR_IDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn samsung_and_google_are_known() {
        assert!(is_known_vendor(0x04e8));
        assert!(is_known_vendor(0x18d1));
        assert!(!is_known_vendor(0x1234));
    }
}
