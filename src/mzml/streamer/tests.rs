use super::*;
use std::io::BufReader;

const MINIMAL_MZML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="test_run" startTimeStamp="2021-03-04T10:15:00Z">
    <spectrumList count="1">
      <spectrum index="0" id="scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <cvParam cvRef="MS" accession="MS:1000130" name="positive scan"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="60.0" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
    </spectrumList>
  </run>
</mzML>"#;

fn streamer_for(xml: &str) -> MzMLStreamer<BufReader<std::io::Cursor<Vec<u8>>>> {
    MzMLStreamer::new(BufReader::new(std::io::Cursor::new(xml.as_bytes().to_vec()))).unwrap()
}

#[test]
fn test_parse_minimal_mzml() {
    let mut streamer = streamer_for(MINIMAL_MZML);

    let spectrum = streamer.next_spectrum().unwrap().unwrap();

    assert_eq!(spectrum.index, 0);
    assert_eq!(spectrum.id, "scan=1");
    assert_eq!(spectrum.ms_level, 1);
    assert!((spectrum.retention_time.unwrap() - 60.0).abs() < 0.001);
    assert_eq!(spectrum.mz_array.len(), 2);
    assert_eq!(spectrum.intensity_array.len(), 2);
    assert!((spectrum.mz_array[0] - 100.0).abs() < 0.001);
    assert!((spectrum.mz_array[1] - 200.0).abs() < 0.001);
    assert!((spectrum.tic() - 300.0).abs() < 0.001);

    assert!(streamer.next_spectrum().unwrap().is_none());
}

#[test]
fn test_metadata_is_read_before_spectra() {
    let mut streamer = streamer_for(MINIMAL_MZML);
    let metadata = streamer.read_metadata().unwrap().clone();

    assert_eq!(metadata.version.as_deref(), Some("1.1.0"));
    assert_eq!(metadata.run_id.as_deref(), Some("test_run"));
    assert_eq!(metadata.run_start_time.as_deref(), Some("2021-03-04T10:15:00Z"));
    assert_eq!(metadata.spectrum_count, Some(1));

    // Second call must not consume the spectrum list
    streamer.read_metadata().unwrap();
    assert_eq!(streamer.spectra().count(), 1);
}

#[test]
fn test_reported_tic_and_filter_string() {
    let xml = MINIMAL_MZML.replace(
        r#"<cvParam cvRef="MS" accession="MS:1000130" name="positive scan"/>"#,
        r#"<cvParam cvRef="MS" accession="MS:1000285" name="total ion current" value="1234.5"/>
        <cvParam cvRef="MS" accession="MS:1000512" name="filter string" value="FTMS + p NSI Full ms"/>"#,
    );
    let mut streamer = streamer_for(&xml);
    let spectrum = streamer.next_spectrum().unwrap().unwrap();

    assert_eq!(spectrum.total_ion_current, Some(1234.5));
    assert!((spectrum.tic() - 1234.5).abs() < 1e-9);
    assert_eq!(spectrum.filter_string.as_deref(), Some("FTMS + p NSI Full ms"));
}

#[test]
fn test_escaped_attribute_values_are_unescaped() {
    let xml = MINIMAL_MZML
        .replace(
            r#"<cvParam cvRef="MS" accession="MS:1000130" name="positive scan"/>"#,
            r#"<cvParam cvRef="MS" accession="MS:1000512" name="filter string" value="FTMS + p NSI &amp; d &lt;100-200&gt;"/>"#,
        )
        .replace(r#"id="test_run""#, r#"id="run &quot;a&quot;""#);
    let mut streamer = streamer_for(&xml);

    let metadata = streamer.read_metadata().unwrap().clone();
    assert_eq!(metadata.run_id.as_deref(), Some(r#"run "a""#));

    let spectrum = streamer.next_spectrum().unwrap().unwrap();
    assert_eq!(
        spectrum.filter_string.as_deref(),
        Some("FTMS + p NSI & d <100-200>")
    );
}

#[test]
fn test_retention_time_in_minutes_is_normalized() {
    let xml = MINIMAL_MZML
        .replace(r#"value="60.0""#, r#"value="2.5""#)
        .replace("UO:0000010", "UO:0000031");
    let mut streamer = streamer_for(&xml);
    let spectrum = streamer.next_spectrum().unwrap().unwrap();

    assert!((spectrum.retention_time.unwrap() - 150.0).abs() < 1e-9);
}

#[test]
fn test_array_length_mismatch_is_an_error() {
    let xml = MINIMAL_MZML.replace(r#"defaultArrayLength="2""#, r#"defaultArrayLength="3""#);
    let mut streamer = streamer_for(&xml);

    match streamer.next_spectrum() {
        Err(MzMLError::BinaryError { id, .. }) => assert_eq!(id, "scan=1"),
        other => panic!("expected binary error, got {:?}", other),
    }
}

#[test]
fn test_truncated_spectrum_is_invalid_structure() {
    let cut = MINIMAL_MZML.find("</spectrum>").unwrap();
    let mut streamer = streamer_for(&MINIMAL_MZML[..cut]);

    assert!(matches!(
        streamer.next_spectrum(),
        Err(MzMLError::InvalidStructure(_)) | Err(MzMLError::XmlError(_))
    ));
}

#[test]
fn test_empty_spectrum_list() {
    let xml = r#"<?xml version="1.0"?>
<mzML version="1.1.0"><run id="empty"><spectrumList count="0"/></run></mzML>"#;
    let mut streamer = streamer_for(xml);

    assert!(streamer.next_spectrum().unwrap().is_none());
    assert_eq!(streamer.metadata().spectrum_count, Some(0));
}

#[test]
fn test_scan_number_extraction() {
    let spectrum = crate::mzml::models::MzMLSpectrum {
        id: "controllerType=0 controllerNumber=1 scan=12345".to_string(),
        ..Default::default()
    };
    assert_eq!(spectrum.scan_number(), Some(12345));

    let spectrum2 = crate::mzml::models::MzMLSpectrum {
        id: "scan=999".to_string(),
        ..Default::default()
    };
    assert_eq!(spectrum2.scan_number(), Some(999));

    let spectrum3 = crate::mzml::models::MzMLSpectrum {
        id: "index=4".to_string(),
        index: 4,
        ..Default::default()
    };
    assert_eq!(spectrum3.scan_number(), Some(5));
}
