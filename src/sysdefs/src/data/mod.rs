pub mod fs_struct;
