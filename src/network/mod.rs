pub mod udpwriter;
