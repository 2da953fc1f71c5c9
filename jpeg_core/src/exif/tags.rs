//! Static EXIF tag table.
//!
//! Names and descriptions for the tag ids the decoder knows about, sorted by
//! id so lookups can binary-search. Ids not listed here still come back from
//! the decoder, just without a symbolic name.

/// `(id, name, description)` sorted ascending by id.
const TAG_TABLE: &[(u16, &str, &str)] = &[
    (0x010E, "ImageDescription", "Describes the image."),
    (0x010F, "Make", "Manufacturer of the camera."),
    (0x0110, "Model", "Model number of the camera."),
    (0x0112, "Orientation", "Orientation of the camera relative to the scene: 1 upper left, 3 lower right, 6 upper right, 8 lower left, 9 undefined."),
    (0x011A, "XResolution", "Display/print resolution of the image; most cameras store 1/72 inch."),
    (0x011B, "YResolution", "Display/print resolution of the image; most cameras store 1/72 inch."),
    (0x0128, "ResolutionUnit", "Unit of XResolution/YResolution: 1 none, 2 inch, 3 centimeter."),
    (0x0131, "Software", "Firmware version of the camera."),
    (0x0132, "DateTime", "Date/time the image was last modified, format YYYY:MM:DD HH:MM:SS."),
    (0x013B, "Artist", "Person who created the image."),
    (0x013E, "WhitePoint", "Chromaticity of the white point of the image."),
    (0x013F, "PrimaryChromaticities", "Chromaticity of the primaries of the image."),
    (0x0211, "YCbCrCoefficients", "Constants to translate YCbCr to RGB; usually 0.299/0.587/0.114."),
    (0x0213, "YCbCrPositioning", "Chroma sample point of the subsampling pixel array: 1 center, 2 datum point."),
    (0x0214, "ReferenceBlackWhite", "Reference black/white point values per component."),
    (0x8298, "Copyright", "Copyright information."),
    (0x829A, "ExposureTime", "Exposure time (reciprocal of shutter speed), in seconds."),
    (0x829D, "FNumber", "Actual F-number of the lens when the image was taken."),
    (0x8769, "ExifOffset", "Offset to the Exif sub-IFD."),
    (0x8822, "ExposureProgram", "Exposure program: 1 manual, 2 normal, 3 aperture priority, 4 shutter priority, 5 creative, 6 action, 7 portrait, 8 landscape."),
    (0x8825, "GPSInfo", "Offset to the GPS sub-IFD."),
    (0x8827, "ISOSpeedRatings", "CCD sensitivity, equivalent to film speed."),
    (0x9000, "ExifVersion", "Exif version number, stored as 4 ASCII characters."),
    (0x9003, "DateTimeOriginal", "Date/time the original image was taken."),
    (0x9004, "DateTimeDigitized", "Date/time the image was digitized; usually equals DateTimeOriginal."),
    (0x9101, "ComponentConfiguration", "Component layout; usually 0x00 0x01 0x02 0x03."),
    (0x9102, "CompressedBitsPerPixel", "Average compression ratio of the JPEG."),
    (0x9201, "ShutterSpeedValue", "Shutter speed as an APEX value: speed is 1/2^value seconds."),
    (0x9202, "ApertureValue", "Aperture as an APEX value: F-number is sqrt(2)^value."),
    (0x9203, "BrightnessValue", "Brightness of the subject, in EV."),
    (0x9204, "ExposureBiasValue", "Exposure bias, in EV."),
    (0x9205, "MaxApertureValue", "Maximum aperture of the lens as an APEX value."),
    (0x9206, "SubjectDistance", "Distance to the focus point, in meters."),
    (0x9207, "MeteringMode", "Metering method: 1 average, 2 center weighted, 3 spot, 4 multi-spot, 5 multi-segment."),
    (0x9208, "LightSource", "White balance setting: 0 auto, 1 daylight, 2 fluorescent, 3 tungsten, 10 flash."),
    (0x9209, "Flash", "1 when the flash was used, 0 otherwise."),
    (0x920A, "FocalLength", "Focal length of the lens, in millimeters."),
    (0x927C, "MakerNote", "Maker-dependent internal data; some vendors use IFD format for this area."),
    (0x9286, "UserComment", "User comment."),
    (0xA000, "FlashPixVersion", "FlashPix version, 4 ASCII characters."),
    (0xA001, "ColorSpace", "Color space; usually 1 (sRGB)."),
    (0xA002, "ExifImageWidth", "Width of the main image."),
    (0xA003, "ExifImageHeight", "Height of the main image."),
    (0xA004, "RelatedSoundFile", "Name of the related audio file, when one was recorded."),
    (0xA005, "ExifInteroperabilityOffset", "Offset to the interoperability IFD."),
    (0xA20E, "FocalPlaneXResolution", "Pixel X density of the sensor."),
    (0xA20F, "FocalPlaneYResolution", "Pixel Y density of the sensor."),
    (0xA210, "FocalPlaneResolutionUnit", "Unit of the focal plane resolution: 1 none, 2 inch, 3 centimeter."),
    (0xA217, "SensingMethod", "Image sensor type; 2 is a one-chip color area sensor."),
    (0xA300, "FileSource", "File source; 3 for digital cameras."),
    (0xA301, "SceneType", "Scene type; 1 for directly photographed images."),
];

/// Returns `(name, description)` for a known tag id.
pub(super) fn lookup(id: u16) -> Option<(&'static str, &'static str)> {
    TAG_TABLE
        .binary_search_by_key(&id, |entry| entry.0)
        .ok()
        .map(|idx| (TAG_TABLE[idx].1, TAG_TABLE[idx].2))
}

/// Reverse lookup from symbolic name to tag id.
pub(super) fn id_for_name(name: &str) -> Option<u16> {
    TAG_TABLE
        .iter()
        .find(|(_, tag_name, _)| *tag_name == name)
        .map(|(id, _, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in TAG_TABLE.windows(2) {
            assert!(
                pair[0].0 < pair[1].0,
                "table must stay sorted: 0x{:04X} before 0x{:04X}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn test_lookup_known() {
        assert_eq!(lookup(0x010F).map(|(n, _)| n), Some("Make"));
        assert_eq!(lookup(0x8769).map(|(n, _)| n), Some("ExifOffset"));
        assert_eq!(lookup(0xA301).map(|(n, _)| n), Some("SceneType"));
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup(0x0000).is_none());
        assert!(lookup(0xBEEF).is_none());
    }

    #[test]
    fn test_id_for_name_roundtrip() {
        for (id, name, _) in TAG_TABLE {
            assert_eq!(id_for_name(name), Some(*id));
        }
    }
}
