use crate::backend::domain::commands::exports::ExportFile;
use shared::ExportFileResponse;

pub struct ExportMapper;

impl ExportMapper {
    pub fn to_dto(file: ExportFile) -> ExportFileResponse {
        ExportFileResponse {
            filename: file.filename,
            content_type: file.content_type,
            content: file.content,
            expense_count: file.expense_count,
        }
    }
}
