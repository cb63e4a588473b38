//! Arrow views of the payload tables

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Builder, Int16Builder, Int64Builder, StringBuilder, UInt32Builder,
    UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use super::payload::SpectralPayload;

/// Schema of [`SpectralPayload::spectra_batch`]
pub fn spectra_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("spectrum_id", DataType::Int64, false),
        Field::new("retention_time", DataType::Float64, false),
        Field::new("peak_count", DataType::UInt64, false),
        Field::new("tic", DataType::Float64, false),
        Field::new("ms_level", DataType::Int16, false),
        Field::new("filter_string", DataType::Utf8, true),
    ]))
}

/// Schema of [`SpectralPayload::peaks_batch`]
pub fn peaks_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("spectrum_id", DataType::Int64, false),
        Field::new("peak_index", DataType::UInt32, false),
        Field::new("retention_time", DataType::Float64, false),
        Field::new("mz", DataType::Float64, false),
        Field::new("intensity", DataType::Float64, false),
    ]))
}

impl SpectralPayload {
    /// Spectrum summary table as a record batch
    pub fn spectra_batch(&self) -> Result<RecordBatch, ArrowError> {
        let n = self.spectra.len();
        let mut spectrum_id_builder = Int64Builder::with_capacity(n);
        let mut retention_time_builder = Float64Builder::with_capacity(n);
        let mut peak_count_builder = UInt64Builder::with_capacity(n);
        let mut tic_builder = Float64Builder::with_capacity(n);
        let mut ms_level_builder = Int16Builder::with_capacity(n);
        let mut filter_builder = StringBuilder::new();

        for row in &self.spectra {
            spectrum_id_builder.append_value(row.spectrum_id);
            retention_time_builder.append_value(row.retention_time);
            peak_count_builder.append_value(row.peak_count as u64);
            tic_builder.append_value(row.tic);
            ms_level_builder.append_value(row.ms_level);
            filter_builder.append_option(row.filter_string.as_deref());
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(spectrum_id_builder.finish()),
            Arc::new(retention_time_builder.finish()),
            Arc::new(peak_count_builder.finish()),
            Arc::new(tic_builder.finish()),
            Arc::new(ms_level_builder.finish()),
            Arc::new(filter_builder.finish()),
        ];

        RecordBatch::try_new(spectra_schema(), arrays)
    }

    /// Long peak table as a record batch
    pub fn peaks_batch(&self) -> Result<RecordBatch, ArrowError> {
        let n = self.peaks.len();
        let mut spectrum_id_builder = Int64Builder::with_capacity(n);
        let mut peak_index_builder = UInt32Builder::with_capacity(n);
        let mut retention_time_builder = Float64Builder::with_capacity(n);
        let mut mz_builder = Float64Builder::with_capacity(n);
        let mut intensity_builder = Float64Builder::with_capacity(n);

        for peak in &self.peaks {
            spectrum_id_builder.append_value(peak.spectrum_id);
            peak_index_builder.append_value(peak.peak_index);
            retention_time_builder.append_value(peak.retention_time);
            mz_builder.append_value(peak.mz);
            intensity_builder.append_value(peak.intensity);
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(spectrum_id_builder.finish()),
            Arc::new(peak_index_builder.finish()),
            Arc::new(retention_time_builder.finish()),
            Arc::new(mz_builder.finish()),
            Arc::new(intensity_builder.finish()),
        ];

        RecordBatch::try_new(peaks_schema(), arrays)
    }
}
