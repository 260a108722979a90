mod storage;
mod text_processing;
